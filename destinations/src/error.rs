use hyper::http;
use std::{fmt::Display, io, net::SocketAddr};

#[derive(Debug)]
pub enum Error {
    Bind(SocketAddr, hyper::Error),
    IoError(io::Error),
    HyperError(hyper::Error),
    HttpError(http::Error),
    JsonError(serde_json::Error),
    InvalidHeaderName,
    InvalidHeaderValue,
    InvalidConfiguration(&'static str, String),
    RandomSourceUnavailable(String),
    ServerThreadPanicked,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bind(addr, e) => write!(f, "Couldn't bind to {}: {}", addr, e),
            Error::IoError(e) => write!(f, "IoError: {}", e),
            Error::HyperError(e) => write!(f, "Hyper error: {}", e),
            Error::HttpError(e) => write!(f, "Http Error: {}", e),
            Error::JsonError(e) => write!(f, "Json Error: {}", e),
            Error::InvalidHeaderName => write!(f, "Invalid header name"),
            Error::InvalidHeaderValue => write!(f, "Invalid header value"),
            Error::InvalidConfiguration(name, value) => {
                write!(f, "Invalid value for {}: \"{}\"", name, value.escape_default())
            }
            Error::RandomSourceUnavailable(reason) => {
                write!(f, "The random source is unavailable: {}", reason)
            }
            Error::ServerThreadPanicked => write!(f, "The destination server thread panicked"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::HyperError(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::HttpError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e)
    }
}
