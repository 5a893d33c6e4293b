//! Member path renaming.
//!
//! Member names are raw bytes as stored in the archive. Only the leading
//! identifier component is ever touched.

use crate::config::RetagConfig;
use crate::id::{ImageId, IMAGE_ID_LEN};

/// Return the renamed path if `name` is `old_id` or lives under `old_id/`.
///
/// The identifier prefix is matched ASCII case-insensitively and replaced by
/// `new_id`; everything after it is kept verbatim.
pub fn rename_path(name: &[u8], old_id: &ImageId, new_id: &ImageId) -> Option<Vec<u8>> {
    if !is_under(name, old_id) {
        return None;
    }

    let mut renamed = Vec::with_capacity(name.len());
    renamed.extend_from_slice(new_id.as_bytes());
    renamed.extend_from_slice(&name[IMAGE_ID_LEN..]);
    Some(renamed)
}

/// Whether `name` equals `id` or starts with `id/`.
pub fn is_under(name: &[u8], id: &ImageId) -> bool {
    if name.len() < IMAGE_ID_LEN || !name[..IMAGE_ID_LEN].eq_ignore_ascii_case(id.as_bytes()) {
        return false;
    }
    matches!(name.get(IMAGE_ID_LEN), None | Some(b'/'))
}

/// The path of one archive member while it is being copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    bytes: Vec<u8>,
}

impl MemberPath {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Rewrite the identifier prefix in place. Returns whether the path was
    /// under the old identifier.
    pub fn rename(&mut self, config: &RetagConfig) -> bool {
        match rename_path(&self.bytes, &config.old_id, &config.new_id) {
            Some(renamed) => {
                self.bytes = renamed;
                true
            }
            None => false,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy text form for logs and error messages.
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetadataOverrides;

    const OLD: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const NEW: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn ids() -> (ImageId, ImageId) {
        (ImageId::parse(OLD).unwrap(), ImageId::parse(NEW).unwrap())
    }

    fn config() -> RetagConfig {
        let (old, new) = ids();
        RetagConfig::new(old, new, MetadataOverrides::new())
    }

    #[test]
    fn test_rename_exact_name() {
        let (old, new) = ids();
        assert_eq!(rename_path(OLD.as_bytes(), &old, &new), Some(NEW.as_bytes().to_vec()));
    }

    #[test]
    fn test_rename_directory_with_trailing_slash() {
        let (old, new) = ids();
        let renamed = rename_path(format!("{OLD}/").as_bytes(), &old, &new).unwrap();
        assert_eq!(renamed, format!("{NEW}/").into_bytes());
    }

    #[test]
    fn test_rename_nested_path() {
        let (old, new) = ids();
        let renamed = rename_path(format!("{OLD}/sub/file.txt").as_bytes(), &old, &new).unwrap();
        assert_eq!(renamed, format!("{NEW}/sub/file.txt").into_bytes());
    }

    #[test]
    fn test_rename_matches_uppercase_member() {
        let (old, new) = ids();
        let name = format!("{}/json", OLD.to_uppercase());
        let renamed = rename_path(name.as_bytes(), &old, &new).unwrap();
        assert_eq!(renamed, format!("{NEW}/json").into_bytes());
    }

    #[test]
    fn test_no_rename_without_separator() {
        let (old, new) = ids();
        assert_eq!(rename_path(format!("{OLD}extra/file").as_bytes(), &old, &new), None);
    }

    #[test]
    fn test_no_rename_unrelated_or_short() {
        let (old, new) = ids();
        assert_eq!(rename_path(b"repositories", &old, &new), None);
        assert_eq!(rename_path(b"", &old, &new), None);
        assert_eq!(rename_path(format!("x/{OLD}").as_bytes(), &old, &new), None);
    }

    #[test]
    fn test_rename_is_prefix_only() {
        let (old, new) = ids();
        let name = format!("{OLD}/{OLD}");
        let renamed = rename_path(name.as_bytes(), &old, &new).unwrap();
        assert_eq!(renamed, format!("{NEW}/{OLD}").into_bytes());
    }

    #[test]
    fn test_rename_keeps_non_utf8_tail() {
        let (old, new) = ids();
        let mut name = format!("{OLD}/").into_bytes();
        name.extend_from_slice(&[0xff, 0xfe]);
        let renamed = rename_path(&name, &old, &new).unwrap();
        assert_eq!(&renamed[IMAGE_ID_LEN..], &[b'/', 0xff, 0xfe]);
    }

    #[test]
    fn test_member_path_rename() {
        let config = config();
        let mut path = MemberPath::new(format!("{OLD}/layer.tar"));
        assert!(path.rename(&config));
        assert_eq!(path.display(), format!("{NEW}/layer.tar"));
    }

    #[test]
    fn test_member_path_second_rename_is_noop() {
        let config = config();
        let mut path = MemberPath::new(format!("{OLD}/VERSION"));
        assert!(path.rename(&config));
        assert!(!path.rename(&config));
        assert_eq!(path.display(), format!("{NEW}/VERSION"));
    }
}
