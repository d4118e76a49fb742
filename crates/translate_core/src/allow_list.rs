/// Case-insensitive allow-list of file extensions in leading-dot form (`.pdf`).
///
/// An empty list accepts every name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    extensions: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            if ext.is_empty() {
                continue;
            }
            let ext = format!(".{}", ext.to_ascii_lowercase());
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        Self {
            extensions: normalized,
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn allows(&self, filename: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match extension_of(filename) {
            Some(ext) => self
                .extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }

    /// Names from `filenames` that the list does not allow, in input order.
    pub fn rejected<'a, I>(&self, filenames: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        filenames
            .into_iter()
            .filter(|name| !self.allows(name))
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new([".txt", ".srt"])
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{ext}"))
}
