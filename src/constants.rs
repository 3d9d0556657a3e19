/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const ENV_API_URL: &str = "MAILWIZARD_API_URL";
pub const ENV_CONFIG_PREFIX: &str = "MAILWIZARD_";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

// Backend paths
pub const HEALTH_PATH: &str = "/health";
pub const HEALTH_FALLBACK_PATH: &str = "/api/health";
pub const GENERATE_PATH: &str = "/api/generate";
pub const FEEDBACK_PATH: &str = "/api/feedback";
pub const FINALIZE_PATH: &str = "/api/finalize";
pub const SEND_EMAIL_PATH: &str = "/api/send-email";
pub const SESSION_PATH: &str = "/api/session";

// Input limits (mirrors what the backend enforces)
pub const MIN_TOPIC_CHARS: usize = 3;
pub const MAX_TOPIC_CHARS: usize = 500;
pub const MAX_FEEDBACK_CHARS: usize = 1000;

// Recipient address pattern
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
