use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Upper bound on image files accepted with a single project.
pub const MAX_IMAGES_PER_PROJECT: usize = 5;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public URL prefix under which stored images are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";
