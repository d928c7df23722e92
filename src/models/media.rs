use std::fmt;

/// Where a media reference lives on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn directory(&self) -> &'static str {
        match self {
            MediaKind::Photo => "img/news",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => f.write_str("photo"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// How an update treats an entry's media references.
///
/// `ReplaceWith` carries references the caller wants to keep, so only those
/// already on the entry survive. `ReplaceWithUnion` puts freshly uploaded
/// references first, followed by the kept ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaUpdate {
    Keep,
    ReplaceWith(Vec<String>),
    ReplaceWithUnion(Vec<String>, Vec<String>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaOutcome {
    pub refs: Vec<String>,
    pub released: Vec<String>,
}

impl MediaUpdate {
    pub fn resolve(uploaded: Option<Vec<String>>, retained: Option<Vec<String>>) -> Self {
        match (uploaded, retained) {
            (Some(uploaded), retained) => {
                MediaUpdate::ReplaceWithUnion(uploaded, retained.unwrap_or_default())
            }
            (None, Some(retained)) => MediaUpdate::ReplaceWith(retained),
            (None, None) => MediaUpdate::Keep,
        }
    }

    /// Single-slot variant used for the video reference. `Some(None)` for
    /// `retained` means the caller explicitly dropped the current video.
    pub fn resolve_single(uploaded: Option<String>, retained: Option<Option<String>>) -> Self {
        match (uploaded, retained) {
            (Some(uploaded), _) => MediaUpdate::ReplaceWithUnion(vec![uploaded], Vec::new()),
            (None, Some(retained)) => MediaUpdate::ReplaceWith(retained.into_iter().collect()),
            (None, None) => MediaUpdate::Keep,
        }
    }

    pub fn apply(self, current: &[String]) -> MediaOutcome {
        let refs = match self {
            MediaUpdate::Keep => {
                return MediaOutcome {
                    refs: current.to_vec(),
                    released: Vec::new(),
                }
            }
            MediaUpdate::ReplaceWith(retained) => keep_existing(retained, current),
            MediaUpdate::ReplaceWithUnion(uploaded, retained) => {
                let mut refs = dedup(uploaded);
                for r in keep_existing(retained, current) {
                    if !refs.contains(&r) {
                        refs.push(r);
                    }
                }
                refs
            }
        };

        let released = dedup(
            current
                .iter()
                .filter(|r| !refs.contains(r))
                .cloned()
                .collect(),
        );

        MediaOutcome { refs, released }
    }
}

fn keep_existing(retained: Vec<String>, current: &[String]) -> Vec<String> {
    dedup(
        retained
            .into_iter()
            .filter(|r| current.contains(r))
            .collect(),
    )
}

fn dedup(refs: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(refs.len());
    for r in refs {
        if !out.contains(&r) {
            out.push(r);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_picks_variant_from_inputs() {
        assert_eq!(MediaUpdate::resolve(None, None), MediaUpdate::Keep);
        assert_eq!(
            MediaUpdate::resolve(None, Some(refs(&["a"]))),
            MediaUpdate::ReplaceWith(refs(&["a"]))
        );
        assert_eq!(
            MediaUpdate::resolve(Some(refs(&["n"])), None),
            MediaUpdate::ReplaceWithUnion(refs(&["n"]), vec![])
        );
    }

    #[test]
    fn keep_releases_nothing() {
        let out = MediaUpdate::Keep.apply(&refs(&["a", "b"]));
        assert_eq!(out.refs, refs(&["a", "b"]));
        assert!(out.released.is_empty());
    }

    #[test]
    fn replace_with_prunes_unlisted_refs() {
        let out = MediaUpdate::ReplaceWith(refs(&["a", "b"])).apply(&refs(&["a", "b", "c"]));
        assert_eq!(out.refs, refs(&["a", "b"]));
        assert_eq!(out.released, refs(&["c"]));
    }

    #[test]
    fn replace_with_ignores_refs_not_on_entry() {
        let out = MediaUpdate::ReplaceWith(refs(&["a", "zzz"])).apply(&refs(&["a", "b"]));
        assert_eq!(out.refs, refs(&["a"]));
        assert_eq!(out.released, refs(&["b"]));
    }

    #[test]
    fn union_puts_uploads_first_and_releases_the_rest() {
        let out = MediaUpdate::ReplaceWithUnion(refs(&["new.jpg"]), refs(&["b"]))
            .apply(&refs(&["a", "b", "c"]));
        assert_eq!(out.refs, refs(&["new.jpg", "b"]));
        assert_eq!(out.released, refs(&["a", "c"]));
    }

    #[test]
    fn duplicated_current_refs_are_released_once() {
        let out = MediaUpdate::ReplaceWith(vec![]).apply(&refs(&["a", "a"]));
        assert!(out.refs.is_empty());
        assert_eq!(out.released, refs(&["a"]));
    }

    #[test]
    fn single_slot_upload_replaces_video() {
        let out = MediaUpdate::resolve_single(Some("clip2.mp4".into()), None)
            .apply(&refs(&["clip1.mp4"]));
        assert_eq!(out.refs, refs(&["clip2.mp4"]));
        assert_eq!(out.released, refs(&["clip1.mp4"]));
    }

    #[test]
    fn single_slot_explicit_null_clears_video() {
        let out = MediaUpdate::resolve_single(None, Some(None)).apply(&refs(&["clip1.mp4"]));
        assert!(out.refs.is_empty());
        assert_eq!(out.released, refs(&["clip1.mp4"]));
    }
}
