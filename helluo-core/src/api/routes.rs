//! Route definitions shared by the server and its clients.
//!
//! Paths are unversioned; the admin UI already depends on them.

macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

pub const ROOT: &str = "/api";

pub const AUTH: &str = api_path!("/auth");
pub const UPLOAD: &str = api_path!("/upload");

pub const CARNETS: &str = api_path!("/carnets");
pub const PORTFOLIO: &str = api_path!("/portfolio");
pub const CATEGORIES: &str = api_path!("/categories");
pub const EXHIBITIONS: &str = api_path!("/exhibitions");

pub const HEALTH: &str = "/health";
