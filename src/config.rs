//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `EnvFilter` directive for the log subscriber.
    pub log_filter: Option<String>,
    pub write_log: Option<String>,
    pub debug: bool,
    pub force_show_windows: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt("CONDUCTOR_LOG"),
            write_log: env_string_opt("CONDUCTOR_WRITE_LOG"),
            debug: env_flag("CONDUCTOR_DEBUG"),
            force_show_windows: env_flag("CONDUCTOR_SHOW_WINDOWS"),
        }
    }

    /// Filter directive to install: explicit filter first, then the debug flag.
    pub fn log_directive(&self) -> &str {
        match &self.log_filter {
            Some(filter) => filter,
            None if self.debug => "debug",
            None => "info",
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::EnvConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_are_off() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CONDUCTOR_LOG", None);
        let _g2 = set_env_guard("CONDUCTOR_WRITE_LOG", None);
        let _g3 = set_env_guard("CONDUCTOR_DEBUG", None);
        let _g4 = set_env_guard("CONDUCTOR_SHOW_WINDOWS", None);

        let config = EnvConfig::from_env();
        assert!(config.log_filter.is_none());
        assert!(config.write_log.is_none());
        assert!(!config.debug);
        assert!(!config.force_show_windows);
        assert_eq!(config.log_directive(), "info");
    }

    #[test]
    fn env_flags_set_to_one_enable() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CONDUCTOR_LOG", None);
        let _g2 = set_env_guard("CONDUCTOR_WRITE_LOG", Some("/tmp/conductor.log"));
        let _g3 = set_env_guard("CONDUCTOR_DEBUG", Some("1"));
        let _g4 = set_env_guard("CONDUCTOR_SHOW_WINDOWS", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.write_log.as_deref(), Some("/tmp/conductor.log"));
        assert!(config.debug);
        assert!(config.force_show_windows);
        assert_eq!(config.log_directive(), "debug");
    }

    #[test]
    fn explicit_filter_wins_and_blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CONDUCTOR_LOG", Some("conductor=trace"));
        let _g2 = set_env_guard("CONDUCTOR_WRITE_LOG", Some("  "));
        let _g3 = set_env_guard("CONDUCTOR_DEBUG", Some("1"));

        let config = EnvConfig::from_env();
        assert!(config.write_log.is_none());
        assert_eq!(config.log_directive(), "conductor=trace");
    }
}
