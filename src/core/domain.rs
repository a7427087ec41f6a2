use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}


// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub fine_per_day: i64,
    pub extension_days: i64,
    pub reservation_hold_days: i64,
    pub reservation_ready_days: i64,
    pub max_pending_reservations: usize,
    pub membership_days: i64,
    pub default_max_books: i64,
    pub default_max_loan_days: i64,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            fine_per_day: 5000,
            extension_days: 7,
            reservation_hold_days: 14,
            reservation_ready_days: 3,
            max_pending_reservations: 2,
            membership_days: 365,
            default_max_books: 5,
            default_max_loan_days: 14,
        }
    }

    // from_env overrides the defaults with LMS_* environment variables, e.g. LMS_FINE_PER_DAY.
    pub fn from_env(branch_id: &str) -> Self {
        let defaults = Configuration::new(branch_id);
        Configuration {
            branch_id: std::env::var("LMS_BRANCH_ID").unwrap_or(defaults.branch_id),
            fine_per_day: env_or("LMS_FINE_PER_DAY", defaults.fine_per_day),
            extension_days: env_or("LMS_EXTENSION_DAYS", defaults.extension_days),
            reservation_hold_days: env_or("LMS_RESERVATION_HOLD_DAYS", defaults.reservation_hold_days),
            reservation_ready_days: env_or("LMS_RESERVATION_READY_DAYS", defaults.reservation_ready_days),
            max_pending_reservations: env_or("LMS_MAX_PENDING_RESERVATIONS", defaults.max_pending_reservations),
            membership_days: env_or("LMS_MEMBERSHIP_DAYS", defaults.membership_days),
            default_max_books: env_or("LMS_DEFAULT_MAX_BOOKS", defaults.default_max_books),
            default_max_loan_days: env_or("LMS_DEFAULT_MAX_LOAN_DAYS", defaults.default_max_loan_days),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.branch_id.as_str());
        assert_eq!(5000, config.fine_per_day);
        assert_eq!(7, config.extension_days);
        assert_eq!(14, config.reservation_hold_days);
        assert_eq!(3, config.reservation_ready_days);
        assert_eq!(2, config.max_pending_reservations);
        assert_eq!(365, config.membership_days);
        assert_eq!(5, config.default_max_books);
        assert_eq!(14, config.default_max_loan_days);
    }

    #[tokio::test]
    async fn test_should_override_config_from_env() {
        std::env::set_var("LMS_EXTENSION_DAYS", "10");
        std::env::set_var("LMS_FINE_PER_DAY", "not-a-number");
        let config = Configuration::from_env("env");
        std::env::remove_var("LMS_EXTENSION_DAYS");
        std::env::remove_var("LMS_FINE_PER_DAY");
        assert_eq!(10, config.extension_days);
        assert_eq!(5000, config.fine_per_day);
    }
}
