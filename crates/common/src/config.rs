use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PROD"), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::Production.as_str(), "production");
    }

    #[test]
    #[serial]
    fn test_env_or_parses_and_falls_back() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            env::set_var("COMMON_TEST_VALUE", " 42 ");
            env::set_var("COMMON_TEST_GARBAGE", "forty-two");
            env::remove_var("COMMON_TEST_MISSING");
        }

        assert_eq!(env_or("COMMON_TEST_VALUE", 7u32), 42);
        assert_eq!(env_or("COMMON_TEST_GARBAGE", 7u32), 7);
        assert_eq!(env_or("COMMON_TEST_MISSING", 0.5f32), 0.5);

        unsafe {
            env::remove_var("COMMON_TEST_VALUE");
            env::remove_var("COMMON_TEST_GARBAGE");
        }
    }
}
