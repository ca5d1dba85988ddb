use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// SQLite file for durable storage; in-memory storage when unset.
    pub database_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("DATABASE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
