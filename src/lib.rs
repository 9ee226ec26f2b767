//! A URL-shortening service: short id generation, redirect resolution and a
//! cookie-session auth gate in front of link submission.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod short_id;
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod url_mapping;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod url;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod shortener;
}

pub mod handlers {
    pub mod auth;
    pub mod status;
    pub mod url;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod url;
}
