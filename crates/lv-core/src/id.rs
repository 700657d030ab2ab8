use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by entity uids and catalog ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identity of one persisted entity (element, cable, pipe, fitting, ...).
/// Internally a `Spur` index: 4 bytes, `Copy`, O(1) `Eq` and `Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(Spur);

impl Uid {
    /// Intern an existing uid string (e.g. one read from a project file).
    pub fn intern(s: &str) -> Self {
        Uid(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a uid with a type prefix (e.g. `el-4`, `pipe-12`).
    ///
    /// Skips any candidate that is already interned, so uids loaded from a
    /// project file are never handed out again.
    pub fn fresh(prefix: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}-{n}");
            if !INTERNER.contains(candidate.as_str()) {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Uid::intern(&s))
    }
}

/// Key into the static element catalog (`"pir"`, `"cam_dome"`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(Spur);

impl DefId {
    pub fn intern(s: &str) -> Self {
        DefId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DefId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DefId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DefId::intern(&s))
    }
}
