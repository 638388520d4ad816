//! Per-request rendering state shared by the decorators of one render call.
//!
//! [`RenderContext`] is a cheap handle to a [`LinkSet`] and the
//! [`LinkResolver`] that classifies new links. Clones share state; the
//! handle is `!Send`, so each request (and each thread) builds its own.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

/// Where a link points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkClass {
    /// A local file that exists and can be loaded as is.
    LocalFileExists,
    /// A local page that does not exist yet and will be generated.
    LocalGenerated,
    /// Anything with a scheme or a network path.
    Remote,
}

impl LinkClass {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::LocalFileExists => "linkLoad",
            Self::LocalGenerated => "linkCreate",
            Self::Remote => "linkExternal",
        }
    }
}

/// Classifies links seen for the first time.
pub trait LinkResolver {
    fn classify(&self, link: &str) -> LinkClass;
}

impl<F: Fn(&str) -> LinkClass> LinkResolver for F {
    fn classify(&self, link: &str) -> LinkClass {
        self(link)
    }
}

/// Resolves local links against a directory on disk.
///
/// Links with a URL scheme or starting with `//` are remote. Other links
/// are paths relative to `root` (a leading `/` is relative to `root` as
/// well); query and fragment are ignored. A link to nothing but a fragment
/// refers to the page itself and counts as existing.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LinkResolver for FsResolver {
    fn classify(&self, link: &str) -> LinkClass {
        if link.starts_with("//") || Url::parse(link).is_ok() {
            return LinkClass::Remote;
        }
        let path = link.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() {
            return LinkClass::LocalFileExists;
        }
        if self.root.join(path.trim_start_matches('/')).exists() {
            LinkClass::LocalFileExists
        } else {
            LinkClass::LocalGenerated
        }
    }
}

/// Generation bucket of a [`LinkSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Links from finished generations.
    All,
    /// Links being processed.
    Current,
    /// Links discovered during this generation.
    Next,
}

/// Links seen while rendering, bucketed by generation.
///
/// A crawler renders the pages of the `current` generation; every link those
/// pages contain that was not seen before lands in `next`. [`LinkSet::clear`]
/// then retires `current` into `all` and promotes `next`. A link is
/// classified once, when first seen, and lives in exactly one bucket.
#[derive(Debug, Default, Clone)]
pub struct LinkSet {
    all: BTreeMap<String, LinkClass>,
    current: BTreeMap<String, LinkClass>,
    next: BTreeMap<String, LinkClass>,
}

impl LinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket holding `link` and its class.
    #[must_use]
    pub fn lookup(&self, link: &str) -> Option<(Generation, LinkClass)> {
        [
            (Generation::Next, &self.next),
            (Generation::Current, &self.current),
            (Generation::All, &self.all),
        ]
        .into_iter()
        .find_map(|(generation, bucket)| bucket.get(link).map(|&class| (generation, class)))
    }

    /// Record `link`, classifying it with `resolver` if it was never seen.
    ///
    /// Links first seen during a pass are looked up in `next` until the
    /// following [`LinkSet::clear`], so a repeat within the pass is served
    /// from there without classifying again.
    pub fn add(&mut self, link: &str, resolver: &dyn LinkResolver) -> LinkClass {
        if let Some((generation, class)) = self.lookup(link) {
            trace!(link, ?generation, "link already known");
            return class;
        }
        let class = resolver.classify(link);
        debug!(link, ?class, "classified new link");
        self.next.insert(link.to_owned(), class);
        class
    }

    /// Retire the current generation and promote the next one.
    pub fn clear(&mut self) {
        let retired = std::mem::take(&mut self.current);
        self.all.extend(retired);
        self.current = std::mem::take(&mut self.next);
    }

    pub fn current(&self) -> impl Iterator<Item = (&str, LinkClass)> {
        self.current.iter().map(|(link, &class)| (link.as_str(), class))
    }

    pub fn next(&self) -> impl Iterator<Item = (&str, LinkClass)> {
        self.next.iter().map(|(link, &class)| (link.as_str(), class))
    }

    /// Number of links in all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len() + self.current.len() + self.next.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Shared {
    links: LinkSet,
    resolver: Box<dyn LinkResolver>,
}

/// Handle to the state of one render request.
#[derive(Clone)]
pub struct RenderContext {
    shared: Rc<RefCell<Shared>>,
}

impl RenderContext {
    pub fn new(resolver: impl LinkResolver + 'static) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                links: LinkSet::new(),
                resolver: Box::new(resolver),
            })),
        }
    }

    /// A context resolving local links against the directory `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(FsResolver::new(root))
    }

    /// Record `link` in the link set and return its class.
    #[must_use]
    pub fn classify(&self, link: &str) -> LinkClass {
        let mut shared = self.shared.borrow_mut();
        let Shared { links, resolver } = &mut *shared;
        links.add(link, resolver.as_ref())
    }

    /// The link set. Do not hold the guard across calls to
    /// [`RenderContext::classify`].
    #[must_use]
    pub fn links(&self) -> Ref<'_, LinkSet> {
        Ref::map(self.shared.borrow(), |shared| &shared.links)
    }

    /// Move on to the next generation of links, see [`LinkSet::clear`].
    pub fn next_generation(&self) {
        self.shared.borrow_mut().links.clear();
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("links", &self.shared.borrow().links)
            .finish_non_exhaustive()
    }
}
