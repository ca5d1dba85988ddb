fn main() {
    println!("cargo:rerun-if-changed=frontend/");

    // The embedded assets folder must exist for the build to succeed.
    let frontend_path = std::path::Path::new("frontend");
    if !frontend_path.exists() {
        eprintln!("Warning: frontend/ directory not found, embedding a placeholder page.");

        std::fs::create_dir_all("frontend").ok();
        std::fs::write(
            "frontend/index.html",
            r#"<!DOCTYPE html>
<html>
<head>
    <title>API Tester</title>
    <style>
        body { font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }
        code { background: #eee; padding: 2px 8px; border-radius: 4px; }
    </style>
</head>
<body>
    <div>
        <h1>API Tester</h1>
        <p>The API is running under <code>/api</code>. No front end is embedded.</p>
    </div>
</body>
</html>"#,
        )
        .ok();
    }
}
