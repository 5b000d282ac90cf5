use crate::{RsqlError, RsqlResult, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
use secstr::SecUtf8;
use std::time::Duration;

/// The immutable parameters of a connection.
///
/// An instance can be created explicitly with a [`ConnectParamsBuilder`],
/// or from a connection string in `attr = value; ...` form:
///
/// ```rust
/// use rsqldrv::{ConnectParams, IntoConnectParams};
///
/// let params = "server = (local):7777; login = John; password = secret"
///     .into_connect_params()
///     .unwrap();
/// assert_eq!(params.host(), "127.0.0.1");
/// ```
///
/// The recognized attributes and their aliases are `server` (`data source`,
/// `address`, `addr`), `login` (`user id`), `password` (`pwd`), `database`
/// (`initial catalog`), and `connection timeout` (`connect timeout`,
/// `timeout`, in seconds). Login and database names are case-insensitive
/// and are normalized to lowercase; the password is kept as given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectParams {
    host: String,
    port: u16,
    login: String,
    password: SecUtf8,
    database: String,
    connect_timeout: Duration,
}

impl ConnectParams {
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::new()
    }

    /// The host name or address of the server.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The TCP port of the server.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The login name, in lowercase.
    pub fn login(&self) -> &str {
        &self.login
    }

    pub(crate) fn password(&self) -> &SecUtf8 {
        &self.password
    }

    /// The initial database, in lowercase; may be empty.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Timeout for establishing and authenticating the connection.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// The server address in `host:port` form.
    pub fn server_name(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A builder for [`ConnectParams`].
///
/// ```rust
/// use rsqldrv::ConnectParams;
///
/// let params = ConnectParams::builder()
///     .host("db.acme.org")
///     .login("john")
///     .password("secret")
///     .database("sales")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConnectParamsBuilder {
    host: Option<String>,
    port: u16,
    login: Option<String>,
    password: Option<String>,
    database: Option<String>,
    connect_timeout: Option<Duration>,
}

impl ConnectParamsBuilder {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            ..Self::default()
        }
    }

    pub fn host<H: AsRef<str>>(&mut self, host: H) -> &mut Self {
        self.host = Some(host.as_ref().to_string());
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn login<L: AsRef<str>>(&mut self, login: L) -> &mut Self {
        self.login = Some(login.as_ref().to_string());
        self
    }

    pub fn password<P: AsRef<str>>(&mut self, password: P) -> &mut Self {
        self.password = Some(password.as_ref().to_string());
        self
    }

    pub fn database<D: AsRef<str>>(&mut self, database: D) -> &mut Self {
        self.database = Some(database.as_ref().to_string());
        self
    }

    pub fn connect_timeout(&mut self, connect_timeout: Duration) -> &mut Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// Produces the `ConnectParams`.
    ///
    /// Fails if no host was given.
    pub fn build(&self) -> RsqlResult<ConnectParams> {
        let host = self
            .host
            .clone()
            .ok_or_else(|| param_error("no server address given".to_string()))?;
        Ok(ConnectParams {
            host,
            port: self.port,
            login: self.login.as_deref().unwrap_or("").to_lowercase(),
            password: SecUtf8::from(self.password.as_deref().unwrap_or("")),
            database: self.database.as_deref().unwrap_or("").to_lowercase(),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        })
    }
}

/// A trait implemented by types that can be used to create a `ConnectParams`.
pub trait IntoConnectParams {
    fn into_connect_params(self) -> RsqlResult<ConnectParams>;
}

impl IntoConnectParams for ConnectParams {
    fn into_connect_params(self) -> RsqlResult<ConnectParams> {
        Ok(self)
    }
}

impl IntoConnectParams for &str {
    fn into_connect_params(self) -> RsqlResult<ConnectParams> {
        parse_connection_string(self)
    }
}

impl IntoConnectParams for String {
    fn into_connect_params(self) -> RsqlResult<ConnectParams> {
        parse_connection_string(&self)
    }
}

fn param_error(msg: String) -> RsqlError {
    RsqlError::conn_params(msg.into())
}

fn parse_connection_string(conn_string: &str) -> RsqlResult<ConnectParams> {
    let mut builder = ConnectParamsBuilder::new();

    for item in conn_string.split(';') {
        if item.trim().is_empty() {
            // consecutive or terminating semicolons
            continue;
        }

        let mut parts = item.splitn(2, '=');
        let attr = parts
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let val = parts
            .next()
            .ok_or_else(|| {
                param_error(
                    "connection string must contain attr=val pairs separated by semicolons"
                        .to_string(),
                )
            })?
            .trim();

        if attr.is_empty() {
            return Err(param_error(
                "connection string attributes cannot be empty".to_string(),
            ));
        }
        if val.is_empty() {
            return Err(param_error(format!(
                "value for connection string attribute \"{attr}\" cannot be empty"
            )));
        }

        match attr.as_str() {
            "server" | "data source" | "address" | "addr" => {
                let (mut host, port) = match val.split_once(':') {
                    None => (val, DEFAULT_PORT),
                    Some((host, port_str)) => {
                        let port = port_str.parse::<u16>().map_err(|_| {
                            param_error(format!("invalid port \"{port_str}\""))
                        })?;
                        (host, port)
                    }
                };
                if host.trim() == "(local)" {
                    host = "127.0.0.1";
                }
                builder.host(host).port(port);
            }
            "login" | "user id" => {
                builder.login(val);
            }
            "password" | "pwd" => {
                builder.password(val);
            }
            "database" | "initial catalog" => {
                builder.database(val);
            }
            "connection timeout" | "connect timeout" | "timeout" => {
                let secs = val.parse::<u64>().map_err(|_| {
                    param_error(format!("invalid connection timeout \"{val}\""))
                })?;
                builder.connect_timeout(Duration::from_secs(secs));
            }
            _ => {
                return Err(param_error(format!(
                    "connection string attribute \"{attr}\" is not supported"
                )));
            }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::{ConnectParams, IntoConnectParams};
    use std::time::Duration;

    #[test]
    fn parse_connection_string() {
        let params = "server = myhost:7878; login = John; password = seCret; \
                      database = Sales; connection timeout = 30;"
            .into_connect_params()
            .unwrap();
        assert_eq!(params.host(), "myhost");
        assert_eq!(params.port(), 7878);
        assert_eq!(params.login(), "john");
        assert_eq!(params.password().unsecure(), "seCret");
        assert_eq!(params.database(), "sales");
        assert_eq!(params.connect_timeout(), Duration::from_secs(30));
        assert_eq!(params.server_name(), "myhost:7878");
    }

    #[test]
    fn aliases_and_defaults() {
        let params = "data source = (local); user id = john; pwd = x;; "
            .into_connect_params()
            .unwrap();
        assert_eq!(params.host(), "127.0.0.1");
        assert_eq!(params.port(), crate::DEFAULT_PORT);
        assert_eq!(params.database(), "");
        assert_eq!(params.connect_timeout(), crate::DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!("server myhost".into_connect_params().is_err());
        assert!("server = ".into_connect_params().is_err());
        assert!(" = x".into_connect_params().is_err());
        assert!("server = myhost:notaport".into_connect_params().is_err());
        assert!("shoe size = 44".into_connect_params().is_err());
        assert!("login = john".into_connect_params().is_err()); // no server
    }

    #[test]
    fn builder() {
        let params = ConnectParams::builder()
            .host("db.acme.org")
            .login("John")
            .password("secret")
            .build()
            .unwrap();
        assert_eq!(params.login(), "john");
        assert_eq!(params.port(), crate::DEFAULT_PORT);
    }
}
