//! Display helpers shared by the API and the CLI

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Characters that are illegal in file names on at least one major platform
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Convert bytes to a human readable size, e.g. `1536` -> `"1.5 KB"`
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0B".to_string();
    }

    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// Convert seconds to `MM:SS`, or `HH:MM:SS` once an hour is reached
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Group digits with commas, e.g. `1234567` -> `"1,234,567"`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Sanitize a media title for use as a local file name.
///
/// Every character in `<>:"/\|?*` and every control character becomes `_`.
/// Surrounding whitespace and trailing dots are dropped since Windows
/// refuses names ending in a dot.
///
/// # Examples
/// ```
/// use mediagrab::utils::format::sanitize_filename;
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "AC_DC_ Live_");
/// assert_eq!(sanitize_filename("   "), "unnamed_file");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = sanitized.trim().trim_end_matches('.').trim_end();

    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    sanitized.to_string()
}

/// Shorten a label to `max_chars` characters, appending `...` when cut
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }

    let head: String = label.chars().take(max_chars).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        // Capped at GB
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(59), "00:59");
        assert_eq!(format_duration(213), "03:33");
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_duration(3723), "01:02:03");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_sanitize_removes_every_illegal_char() {
        let title = r#"a<b>c:d"e/f\g|h?i*j"#;
        let sanitized = sanitize_filename(title);
        for c in ILLEGAL_FILENAME_CHARS {
            assert!(!sanitized.contains(c), "{:?} survived in {:?}", c, sanitized);
        }
        assert_eq!(sanitized, "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn test_sanitize_trims_and_handles_empty() {
        assert_eq!(sanitize_filename("  My Video.  "), "My Video");
        assert_eq!(sanitize_filename("..."), "unnamed_file");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
        assert_eq!(sanitize_filename("normal_file.mp4"), "normal_file.mp4");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 50), "short");
        let long = "x".repeat(60);
        let cut = truncate_label(&long, 50);
        assert_eq!(cut.len(), 53);
        assert!(cut.ends_with("..."));
        // Multi-byte titles are cut on char boundaries
        assert_eq!(truncate_label("日本語のタイトル", 3), "日本語...");
    }
}
