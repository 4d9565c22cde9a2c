use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::{SpritemillError, SpritemillResult};

/// One (character, animation) pair, e.g. `Alex` + `Walking`. Its display
/// form `Alex_Walking` is the grouping key and the output video base name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct AnimKey {
    pub character: String,
    pub animation: String,
}

impl AnimKey {
    pub fn new(character: impl Into<String>, animation: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            animation: animation.into(),
        }
    }
}

impl fmt::Display for AnimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.character, self.animation)
    }
}

/// A single source frame on disk, identified by the index embedded in its
/// filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFrame {
    pub index: u32,
    pub path: PathBuf,
}

/// The per-key frame sequences found in a moves directory, keyed by the
/// `<character>_<animation>` string and sorted ascending by frame index.
pub type FrameGroups = BTreeMap<String, Vec<SourceFrame>>;

/// Split a frame file stem `<character>_<animation>_<index>` into its
/// grouping key and frame index.
pub fn parse_frame_stem(stem: &str) -> SpritemillResult<(String, u32)> {
    let Some((key, index)) = stem.rsplit_once('_') else {
        return Err(SpritemillError::input(format!(
            "frame name '{stem}' has no '_<index>' suffix"
        )));
    };
    let index = index.parse::<u32>().map_err(|_| {
        SpritemillError::input(format!(
            "frame name '{stem}' has a non-numeric index '{index}'"
        ))
    })?;
    Ok((key.to_string(), index))
}

/// Scan a directory of `*.png` frames and group them by animation key.
///
/// A stem without a parseable trailing index is fatal for the whole run:
/// grouping cannot proceed safely past it.
pub fn collect_animations(dir: &Path) -> SpritemillResult<FrameGroups> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("read moves directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
        .collect();
    paths.sort();

    let mut groups = FrameGroups::new();
    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                SpritemillError::input(format!("non-UTF-8 frame name '{}'", path.display()))
            })?;
        let (key, index) = parse_frame_stem(stem)?;
        groups
            .entry(key)
            .or_default()
            .push(SourceFrame { index, path });
    }

    for frames in groups.values_mut() {
        frames.sort_by_key(|f| f.index);
    }
    Ok(groups)
}

/// The encode work derived from one scan: present jobs in allow-list
/// order, plus the allow-listed keys that had no frames on disk.
#[derive(Clone, Debug, Default)]
pub struct BatchPlan {
    pub jobs: Vec<(String, Vec<SourceFrame>)>,
    pub missing: Vec<String>,
}

/// Select the allow-listed animations out of a scan. Keys on disk that are
/// not allow-listed are dropped without comment.
pub fn plan_batch(groups: &FrameGroups, allowed: &[AnimKey]) -> BatchPlan {
    let mut plan = BatchPlan::default();
    for key in allowed {
        let name = key.to_string();
        match groups.get(&name) {
            Some(frames) => plan.jobs.push((name, frames.clone())),
            None => plan.missing.push(name),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn parse_frame_stem_splits_on_last_underscore() {
        assert_eq!(
            parse_frame_stem("Alex_Walking_12").unwrap(),
            ("Alex_Walking".to_string(), 12)
        );
        assert_eq!(parse_frame_stem("Ryan_Hurt_0").unwrap(), ("Ryan_Hurt".to_string(), 0));
    }

    #[test]
    fn parse_frame_stem_rejects_malformed_names() {
        assert!(parse_frame_stem("cover").is_err());
        assert!(parse_frame_stem("Alex_Walking_final").is_err());
    }

    #[test]
    fn grouping_sorts_by_index_regardless_of_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "A_Walking_0.png");
        touch(dir.path(), "A_Walking_2.png");
        touch(dir.path(), "A_Walking_1.png");
        touch(dir.path(), "notes.txt");

        let groups = collect_animations(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        let indices: Vec<u32> = groups["A_Walking"].iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn grouping_is_fatal_on_malformed_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "A_Walking_0.png");
        touch(dir.path(), "cover.png");

        assert!(collect_animations(dir.path()).is_err());
    }

    #[test]
    fn plan_batch_reports_missing_keys_in_allow_list_order() {
        let mut groups = FrameGroups::new();
        groups.insert(
            "Alex_Walking".to_string(),
            vec![SourceFrame {
                index: 0,
                path: PathBuf::from("Alex_Walking_0.png"),
            }],
        );
        // Present on disk but not allow-listed: must be dropped silently.
        groups.insert(
            "Zoe_Dancing".to_string(),
            vec![SourceFrame {
                index: 0,
                path: PathBuf::from("Zoe_Dancing_0.png"),
            }],
        );

        let allowed = vec![AnimKey::new("Alex", "Walking"), AnimKey::new("Ryan", "Kicking")];
        let plan = plan_batch(&groups, &allowed);

        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].0, "Alex_Walking");
        assert_eq!(plan.missing, vec!["Ryan_Kicking".to_string()]);
    }
}
