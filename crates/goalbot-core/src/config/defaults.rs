//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "goalbot".to_string()
}

pub fn default_data_dir() -> String {
    "~/.goalbot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_poll_timeout() -> u64 {
    60
}

pub fn default_error_delay() -> u64 {
    1
}

pub fn default_send_timeout() -> u64 {
    10
}

pub fn default_db_path() -> String {
    "~/.goalbot/data/goalbot.db".to_string()
}

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}
