use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

const MAX_STEM_CHARS: usize = 40;
const MAX_FILE_NAME_CHARS: usize = 255;

static SAFE_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("file name pattern is valid")
});

static UNSAFE_STEM_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_-]+").expect("stem pattern is valid")
});

/// Builds a collision-free stored name: `<random token>-<sanitized stem>.<ext>`.
/// The extension always comes from sniffed content, never from the client.
pub fn unique_file_name(original_name: Option<&str>, extension: &str) -> String {
    let stem = original_name.map(sanitize_stem).unwrap_or_default();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };

    format!("{}-{}.{}", Uuid::new_v4().simple(), stem, extension)
}

/// True when `name` is a bare file name that cannot escape the uploads directory.
pub fn is_safe_file_name(name: &str) -> bool {
    name.len() <= MAX_FILE_NAME_CHARS
        && !name.contains("..")
        && SAFE_FILE_NAME.is_match(name)
}

fn sanitize_stem(original: &str) -> String {
    // browsers may send a full client path
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    UNSAFE_STEM_CHARS
        .replace_all(stem, "-")
        .trim_matches('-')
        .chars()
        .take(MAX_STEM_CHARS)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_keep_a_readable_stem() {
        let name = unique_file_name(Some("My Screenshot (1).PNG"), "png");
        assert!(name.ends_with("-my-screenshot-1.png"), "{name}");
        assert!(is_safe_file_name(&name));
    }

    #[test]
    fn client_paths_and_missing_names_are_handled() {
        let name = unique_file_name(Some("C:\\Users\\me\\..\\cat.jpeg"), "jpg");
        assert!(name.ends_with("-cat.jpg"), "{name}");

        let unnamed = unique_file_name(None, "webp");
        assert!(unnamed.ends_with("-image.webp"), "{unnamed}");
    }

    #[test]
    fn two_uploads_with_the_same_name_do_not_collide() {
        assert_ne!(unique_file_name(Some("a.png"), "png"), unique_file_name(Some("a.png"), "png"));
    }

    #[test]
    fn traversal_and_hidden_names_are_unsafe() {
        assert!(!is_safe_file_name("../etc/passwd"));
        assert!(!is_safe_file_name("a..b.png"));
        assert!(!is_safe_file_name(".env"));
        assert!(!is_safe_file_name("dir/file.png"));
        assert!(!is_safe_file_name(""));
        assert!(is_safe_file_name("3f2a-photo.png"));
    }
}
