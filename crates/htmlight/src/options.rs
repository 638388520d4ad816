#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which column of a side-by-side rendering shows the original file.
///
/// Also decides which unified diff marker belongs to the original: with
/// [`OriginalSide::Left`] the original is the `-` side of the diff, with
/// [`OriginalSide::Right`] it is the `+` side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OriginalSide {
    #[default]
    Left,
    Right,
}

/// Configuration for [`SideBySide`](crate::SideBySide).
///
/// # Examples
///
/// ```rust
/// use htmlight::{DiffOptions, OriginalSide};
///
/// let options = DiffOptions {
///     original_side: OriginalSide::Right,
///     tab_width: Some(4),
/// };
/// assert_eq!(options.original_side, OriginalSide::Right);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiffOptions {
    /// Column holding the original file.
    ///
    /// # Default
    ///
    /// [`OriginalSide::Left`]
    pub original_side: OriginalSide,

    /// Expand horizontal tabs to the next multiple of this width before the
    /// text reaches the column decorators. `None` keeps tabs as they are.
    ///
    /// # Default
    ///
    /// `None`
    pub tab_width: Option<usize>,
}

/// What a link decorator does with the `href` of an anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkPolicy {
    /// Leave the target alone and tag the anchor with a CSS class telling
    /// whether it points to an existing local file, a page that will be
    /// generated, or a remote resource.
    #[default]
    Classify,

    /// Rewrite local targets into absolute URLs resolved against `base`.
    Absolute { base: String },

    /// Point local targets that exist on disk at a cached copy, named by
    /// appending `suffix` to the original target. See [`LinkPolicy::cached`].
    Cached { suffix: String },
}

impl LinkPolicy {
    /// [`LinkPolicy::Cached`] with the usual `.html` suffix.
    #[must_use]
    pub fn cached() -> Self {
        Self::Cached {
            suffix: ".html".to_owned(),
        }
    }
}
