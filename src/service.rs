use crate::address::{parse_address, parse_path_address, CanonicalIpAddr, InvalidAddressError};
use crate::config::Config;
use crate::entry::GeoEntry;
use crate::geo::{GeoDatabases, LookupError};
use crate::header_tools::{address_header, entry_headers, link_header, X_GEOIP_ADDRESS};
use crate::lookup::GeoLookup;

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, LINK,
};
use hyper::body::HttpBody;
use hyper::{Body, Method, Request, Response, StatusCode, Uri};
use std::collections::BTreeMap;
use std::net::IpAddr;
use thiserror::Error;

pub const MAX_BATCH_SIZE: usize = 100;
/// 100 longest IPv6 literals with quotes and separators fit many times over
pub const MAX_BATCH_BODY_SIZE: usize = 64 * 1024;

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddressError),
    #[error("Only 100 address requests allowed at once")]
    TooManyAddresses,
    #[error("Request body must be a JSON array of addresses: {0}")]
    InvalidBody(serde_json::Error),
    #[error("Request body is larger than {} bytes", MAX_BATCH_BODY_SIZE)]
    BodyTooLarge,
    #[error("Cannot read request body: {0}")]
    BodyRead(#[from] hyper::Error),
    #[error("We ran into an error: {0}")]
    Lookup(#[from] LookupError),
    #[error("We ran into an error: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InvalidConfigError {
    #[error("at least one of city, asn or isp databases must be configured")]
    NoDatabases,
    #[error(r#"address_header "{name}" is not a valid header name: {error}"#)]
    AddressHeader {
        name: String,
        error: InvalidHeaderName,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Root,
    /// Known to be asked by browsers and crawlers
    KnownNotFound,
    Address(&'a str),
    Country(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    fn from_path(path: &'a str) -> Self {
        match path {
            "/" => Self::Root,
            "/favicon.ico" | "/robots.txt" => Self::KnownNotFound,
            _ => match path.strip_prefix("/country/") {
                Some(address) => Self::segment(address).map_or(Self::NotFound, Self::Country),
                None => Self::segment(path.strip_prefix('/').unwrap_or(path))
                    .map_or(Self::NotFound, Self::Address),
            },
        }
    }

    fn segment(s: &'a str) -> Option<&'a str> {
        (!s.is_empty() && !s.contains('/')).then_some(s)
    }
}

pub struct GeoIpService {
    address_header: HeaderName,
    response_headers: HeaderMap,
    lookup: GeoLookup,
}

impl GeoIpService {
    pub fn new(databases: GeoDatabases) -> Self {
        Self {
            address_header: HeaderName::from_static(X_GEOIP_ADDRESS),
            response_headers: HeaderMap::new(),
            lookup: GeoLookup::new(databases),
        }
    }

    /// Loads databases, so it does blocking IO
    #[cfg(feature = "maxminddb")]
    pub fn from_config(config: Config) -> Result<Self, InvalidConfigError> {
        let Config {
            address_header,
            response_headers,
            databases: databases_config,
            ..
        } = config;

        if databases_config.is_empty() {
            return Err(InvalidConfigError::NoDatabases);
        }
        let address_header = HeaderName::try_from(address_header.as_str()).map_err(|error| {
            InvalidConfigError::AddressHeader {
                name: address_header.clone(),
                error,
            }
        })?;
        let databases = databases_config.load()?;

        Ok(Self {
            address_header,
            response_headers,
            lookup: GeoLookup::new(databases),
        })
    }

    pub fn with_address_header(mut self, address_header: HeaderName) -> Self {
        self.address_header = address_header;
        self
    }

    pub fn with_response_headers(mut self, response_headers: HeaderMap) -> Self {
        self.response_headers = response_headers;
        self
    }
}

impl GeoIpService {
    /// Never fails, errors become responses. Every response is logged.
    pub async fn handle(&self, socket_ip_addr: IpAddr, request: Request<Body>) -> Response<Body> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let response = self
            .response(request)
            .await
            .unwrap_or_else(make_error_response);
        log_response(socket_ip_addr, &method, &uri, &response);
        response
    }

    pub async fn response(&self, request: Request<Body>) -> Result<Response<Body>, ServiceError> {
        let path = request.uri().path().to_owned();
        let route = Route::from_path(&path);
        let mut response = match (request.method(), route) {
            (&Method::OPTIONS, Route::Root | Route::Address(_) | Route::Country(_)) => {
                self.preflight()
            }
            (&Method::GET | &Method::HEAD, Route::Root) => self.header_lookup(request.headers())?,
            (&Method::POST, Route::Root) => self.batch_lookup(request.into_body()).await?,
            (&Method::GET | &Method::HEAD, Route::Address(address)) => self.lookup(address)?,
            (&Method::GET | &Method::HEAD, Route::Country(address)) => {
                self.country_lookup(address)?
            }
            (_, Route::KnownNotFound | Route::NotFound) => empty_response(StatusCode::NOT_FOUND),
            _ => empty_response(StatusCode::METHOD_NOT_ALLOWED),
        };
        let headers = response.headers_mut();
        for (name, value) in &self.response_headers {
            headers.insert(name, value.clone());
        }
        Ok(response)
    }

    fn lookup_entry(&self, address: IpAddr) -> Result<Option<GeoEntry>, ServiceError> {
        Ok(self.lookup.lookup(address)?)
    }

    /// 204 either way, geo headers only if found
    fn header_lookup(&self, headers: &HeaderMap) -> Result<Response<Body>, ServiceError> {
        let address = match address_header(headers, &self.address_header) {
            Some(address) => parse_address(address)?,
            None => return Ok(empty_response(StatusCode::NOT_FOUND)),
        };
        let mut response = empty_response(StatusCode::NO_CONTENT);
        if let Some(entry) = self.lookup_entry(address)? {
            response.headers_mut().extend(entry_headers(&entry));
        }
        allow_any_origin(&mut response);
        Ok(response)
    }

    fn lookup(&self, address: &str) -> Result<Response<Body>, ServiceError> {
        let address = parse_path_address(address)?;
        let entry = match self.lookup_entry(address)? {
            Some(entry) => entry,
            None => return Ok(empty_response(StatusCode::NOT_FOUND)),
        };
        let body = serde_json::to_vec(&entry).map_err(ServiceError::Serialize)?;
        let mut response = text_response(StatusCode::OK, body, APPLICATION_JSON);
        found_headers(&mut response, address, &entry);
        Ok(response)
    }

    /// Never 404, an empty body means unknown country
    fn country_lookup(&self, address: &str) -> Result<Response<Body>, ServiceError> {
        let address = parse_path_address(address)?;
        let mut response = match self.lookup_entry(address)? {
            Some(entry) => {
                let country = entry.country.clone().unwrap_or_default();
                let mut response = text_response(StatusCode::OK, country, TEXT_PLAIN);
                found_headers(&mut response, address, &entry);
                response
            }
            None => text_response(StatusCode::OK, "", TEXT_PLAIN),
        };
        allow_any_origin(&mut response);
        Ok(response)
    }

    /// All addresses are validated before the first lookup
    async fn batch_lookup(&self, body: Body) -> Result<Response<Body>, ServiceError> {
        let body = read_limited(body, MAX_BATCH_BODY_SIZE).await?;
        let requested: Vec<String> =
            serde_json::from_slice(&body).map_err(ServiceError::InvalidBody)?;
        if requested.len() > MAX_BATCH_SIZE {
            return Err(ServiceError::TooManyAddresses);
        }
        let addresses = requested
            .iter()
            .map(|s| parse_address(s))
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = BTreeMap::new();
        for address in addresses {
            if let Some(entry) = self.lookup_entry(address)? {
                entries.insert(address.to_canonical_ip().to_string(), entry);
            }
        }
        let body = serde_json::to_vec(&entries).map_err(ServiceError::Serialize)?;
        Ok(text_response(StatusCode::OK, body, APPLICATION_JSON))
    }

    fn preflight(&self) -> Response<Body> {
        let mut response = empty_response(StatusCode::NO_CONTENT);
        allow_any_origin(&mut response);
        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, HEAD"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from(self.address_header.clone()),
        );
        response
    }
}

/// Stops reading as soon as `limit` is exceeded, Content-Length is checked first
async fn read_limited(mut body: Body, limit: usize) -> Result<Vec<u8>, ServiceError> {
    let size_hint = body.size_hint();
    if size_hint.lower() > limit as u64 {
        return Err(ServiceError::BodyTooLarge);
    }
    let mut bytes = Vec::with_capacity(size_hint.lower() as usize);
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(ServiceError::BodyTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn text_response(
    status: StatusCode,
    body: impl Into<Body>,
    content_type: &'static str,
) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn allow_any_origin(response: &mut Response<Body>) {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

fn found_headers(response: &mut Response<Body>, address: IpAddr, entry: &GeoEntry) {
    allow_any_origin(response);
    let headers = response.headers_mut();
    headers.extend(entry_headers(entry));
    if let Some(link) = link_header(&address.to_canonical_ip().to_string()) {
        headers.insert(LINK, link);
    }
}

pub fn make_error_response(error: ServiceError) -> Response<Body> {
    let status = match error {
        ServiceError::InvalidAddress(_)
        | ServiceError::TooManyAddresses
        | ServiceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        ServiceError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ServiceError::BodyRead(_) | ServiceError::Lookup(_) | ServiceError::Serialize(_) => {
            log::error!("{error}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    text_response(status, error.to_string(), TEXT_PLAIN)
}

fn log_response(
    socket_ip_addr: IpAddr,
    method: &Method,
    uri: &Uri,
    response: &Response<Body>,
) {
    log::info!(
        "{} {} {} {} {}",
        socket_ip_addr,
        method,
        uri,
        response.status(),
        response
            .headers()
            .get(LINK)
            .map(|header_value| header_value.to_str().unwrap_or("-"))
            .unwrap_or("-"),
    );
}
