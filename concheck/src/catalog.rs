//! A registry of the built-in objects, by name.
use crate::error::Error;
use crate::handle::Handle;
use crate::object_type::ObjectType;
use crate::objects::{
    BrokenQueue, MutexDeque, MutexMap, MutexQueue, MutexSet, NonLinearizableQueue,
};

pub(crate) type Binder = fn(&[&str]) -> Result<Handle, Error>;

/// A built-in object that can be verified by name.
pub struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    object_type: ObjectType,
    methods: &'static [&'static str],
    linearizable: bool,
    bind: Binder,
}

impl CatalogEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Returns the methods that are called when none are requested. An empty
    /// list stands for every method of the object.
    pub fn default_methods(&self) -> &'static [&'static str] {
        self.methods
    }

    /// Returns whether the object is expected to be linearizable.
    pub fn is_linearizable(&self) -> bool {
        self.linearizable
    }

    pub(crate) fn binder(&self) -> Binder {
        self.bind
    }

    /// Binds the object to the given methods, or to its default methods if
    /// none are given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the object has no method with one
    /// of the given names.
    pub fn handle(&self, methods: &[&str]) -> Result<Handle, Error> {
        if methods.is_empty() {
            (self.bind)(self.methods)
        } else {
            (self.bind)(methods)
        }
    }
}

static ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "MutexQueue",
        description: "FIFO queue guarded by a single lock",
        object_type: ObjectType::Queue,
        methods: &[],
        linearizable: true,
        bind: Handle::new::<MutexQueue>,
    },
    CatalogEntry {
        name: "MutexDeque",
        description: "Double-ended queue guarded by a single lock",
        object_type: ObjectType::Deque,
        methods: &[],
        linearizable: true,
        bind: Handle::new::<MutexDeque>,
    },
    CatalogEntry {
        name: "MutexMap",
        description: "Ordered map guarded by a single lock",
        object_type: ObjectType::Map,
        methods: &[],
        linearizable: true,
        bind: Handle::new::<MutexMap>,
    },
    CatalogEntry {
        name: "MutexSet",
        description: "Ordered set guarded by a single lock",
        object_type: ObjectType::Set,
        methods: &[],
        linearizable: true,
        bind: Handle::new::<MutexSet>,
    },
    CatalogEntry {
        name: "BrokenQueue",
        description: "Queue that returns incorrect results intermittently",
        object_type: ObjectType::Queue,
        methods: &["offer", "poll"],
        linearizable: false,
        bind: Handle::new::<BrokenQueue>,
    },
    CatalogEntry {
        name: "NonLinearizableQueue",
        description: "Queue that breaks FIFO order",
        object_type: ObjectType::Queue,
        methods: &["offer", "poll"],
        linearizable: false,
        bind: Handle::new::<NonLinearizableQueue>,
    },
];

/// The built-in objects.
///
/// # Examples
///
/// ```
/// use concheck::catalog::Catalog;
/// use concheck::object_type::ObjectType;
///
/// let entry = Catalog::lookup("mutexqueue").unwrap();
/// assert_eq!(entry.object_type(), ObjectType::Queue);
/// assert!(Catalog::search("queue").len() >= 3);
/// ```
pub struct Catalog;

impl Catalog {
    pub fn entries() -> &'static [CatalogEntry] {
        ENTRIES
    }

    /// Returns the entry with the given name, ignoring case.
    pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
        ENTRIES
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Returns every entry whose name, description or object type contains
    /// `term`, ignoring case.
    pub fn search(term: &str) -> Vec<&'static CatalogEntry> {
        let term = term.to_ascii_lowercase();
        ENTRIES
            .iter()
            .filter(|entry| {
                entry.name.to_ascii_lowercase().contains(&term)
                    || entry.description.to_ascii_lowercase().contains(&term)
                    || entry.object_type.name().contains(&term)
            })
            .collect()
    }

    /// Returns every entry for objects of the given type.
    pub fn of_type(object_type: ObjectType) -> Vec<&'static CatalogEntry> {
        ENTRIES
            .iter()
            .filter(|entry| entry.object_type == object_type)
            .collect()
    }
}
