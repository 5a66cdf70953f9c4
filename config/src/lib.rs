use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Settings of the handshake replay tool. Immutable once parsed.
#[derive(Parser, Clone)]
#[command(name = "repl-handshake")]
#[command(about = "Decode a captured MySQL server greeting and print the handshake response")]
#[command(version)]
pub struct Config {
    /// File holding a captured server greeting, packet header included
    pub greeting: PathBuf,

    /// Replication user
    pub username: String,

    /// Password for the replication user
    #[arg(env = "MYSQL_PWD", default_value = "", hide_env_values = true)]
    pub password: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("greeting", &self.greeting)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_password_precedence() {
        std::env::set_var("MYSQL_PWD", "env");
        let conf = Config::try_parse_from(["repl-handshake", "g.bin", "repl", "pw"]).unwrap();
        assert_eq!(conf.password, "pw");

        let conf = Config::try_parse_from(["repl-handshake", "g.bin", "repl"]).unwrap();
        assert_eq!(conf.password, "env");

        std::env::remove_var("MYSQL_PWD");
        let conf = Config::try_parse_from(["repl-handshake", "g.bin", "repl"]).unwrap();
        assert_eq!(conf.greeting, PathBuf::from("g.bin"));
        assert_eq!(conf.username, "repl");
        assert_eq!(conf.password, "");
    }

    #[test]
    fn test_bad_arguments() {
        let err = Config::try_parse_from(["repl-handshake"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Config::try_parse_from(["repl-handshake", "g.bin", "u", "p", "x"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_debug_hides_password() {
        let conf = Config::try_parse_from(["repl-handshake", "g.bin", "repl", "hunter2"]).unwrap();
        assert!(!format!("{:?}", conf).contains("hunter2"));
    }
}
