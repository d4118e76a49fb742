const MAX_NAME_BYTES: usize = 120;

/// Turns a server-reported output filename into a safe local file name.
///
/// Directory components are dropped, characters that are invalid on common
/// filesystems become `_`, and Windows device names get a trailing `_`.
pub fn local_download_name(remote: &str) -> String {
    let base = remote
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(remote);

    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&[' ', '.'][..]);

    let mut name = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        name.push(c);
    }

    if name.is_empty() || name.chars().all(|c| c == '_') {
        return "download".to_string();
    }
    truncate_at_char_boundary(&mut name, MAX_NAME_BYTES);
    let stem_len = name.find('.').unwrap_or(name.len());
    if is_reserved_windows_name(&name[..stem_len]) {
        name.insert(stem_len, '_');
    }
    name
}

fn truncate_at_char_boundary(name: &mut String, max: usize) {
    if name.len() <= max {
        return;
    }
    let mut cut = max;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name.truncate(cut);
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(local_download_name("report_ko.pdf"), "report_ko.pdf");
        assert_eq!(local_download_name("번역본.txt"), "번역본.txt");
    }

    #[test]
    fn drops_directories() {
        assert_eq!(local_download_name("../../etc/passwd"), "passwd");
        assert_eq!(local_download_name("C:\\out\\a.txt"), "a.txt");
    }

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(local_download_name("a?b*c.txt"), "a_b_c.txt");
        assert_eq!(local_download_name("a<>b.txt"), "a_b.txt");
    }

    #[test]
    fn falls_back_for_empty_names() {
        assert_eq!(local_download_name(""), "download");
        assert_eq!(local_download_name(".."), "download");
        assert_eq!(local_download_name("dir/"), "download");
    }

    #[test]
    fn patches_reserved_names() {
        assert_eq!(local_download_name("con.txt"), "con_.txt");
        assert_eq!(local_download_name("LPT1"), "LPT1_");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "가".repeat(100);
        let name = local_download_name(&long);
        assert!(name.len() <= MAX_NAME_BYTES);
        assert!(name.chars().all(|c| c == '가'));
    }
}
