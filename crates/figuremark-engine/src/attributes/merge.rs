//! Merge algebra for [`AttributeSet`].
//!
//! Two total merges with opposite precedence:
//!
//! - [`AttributeSet::update`] (overwrite): the argument wins, and
//!   [`REMOVE_TOKEN`] sentinels delete instead of set.
//! - [`AttributeSet::incorporate`] (fill gaps): the receiver wins and sentinels
//!   are plain strings.
//!
//! Sentinel-valued entries are decoded into [`Edit`]s before anything is
//! applied, so the literal token never leaks into the merge logic itself.

use super::{AttributeSet, ClassList, OrderedMap, REMOVE_TOKEN};

/// One overwrite-merge instruction for a keyed map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit<'a, V> {
    Set(&'a str, &'a V),
    Delete(&'a str),
    ClearAll,
}

/// One overwrite-merge instruction for the class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassEdit<'a> {
    Add(&'a str),
    Remove(&'a str),
    ClearAll,
}

/// One overwrite-merge instruction for the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdEdit<'a> {
    Keep,
    Set(&'a str),
    Clear,
    ClearIfEquals(&'a str),
}

fn id_edit(id: Option<&str>) -> IdEdit<'_> {
    match id {
        None => IdEdit::Keep,
        Some(REMOVE_TOKEN) => IdEdit::Clear,
        Some(id) => match id.strip_prefix(REMOVE_TOKEN) {
            Some(target) => IdEdit::ClearIfEquals(target),
            None => IdEdit::Set(id),
        },
    }
}

fn class_edit(class: &str) -> ClassEdit<'_> {
    if class == REMOVE_TOKEN {
        return ClassEdit::ClearAll;
    }
    match class.strip_prefix(REMOVE_TOKEN) {
        Some(target) => ClassEdit::Remove(target),
        None => ClassEdit::Add(class),
    }
}

fn string_edit<'a>(key: &'a str, value: &'a String) -> Edit<'a, String> {
    if value == REMOVE_TOKEN {
        Edit::Delete(key)
    } else if key == REMOVE_TOKEN {
        Edit::ClearAll
    } else {
        Edit::Set(key, value)
    }
}

fn mark_type_edit<'a>(key: &'a str, classes: &'a ClassList) -> Edit<'a, ClassList> {
    if classes.len() == 1 && classes.contains(REMOVE_TOKEN) {
        Edit::Delete(key)
    } else if key == REMOVE_TOKEN {
        Edit::ClearAll
    } else {
        Edit::Set(key, classes)
    }
}

fn apply_edits<'a, V: Clone + 'a>(
    target: &mut OrderedMap<V>,
    edits: impl Iterator<Item = Edit<'a, V>>,
) {
    for edit in edits {
        match edit {
            Edit::Set(key, value) => {
                target.insert(key, value.clone());
            }
            Edit::Delete(key) => {
                target.remove(key);
            }
            Edit::ClearAll => target.clear(),
        }
    }
}

/// Entries of `inherited` overlaid by `own`: inherited keys keep their position,
/// own-only keys follow.
fn underlay<V: Clone>(own: &OrderedMap<V>, inherited: &OrderedMap<V>) -> OrderedMap<V> {
    let mut merged = inherited.clone();
    for (key, value) in own.iter() {
        merged.insert(key, value.clone());
    }
    merged
}

impl AttributeSet {
    /// Overwrite-merge `other` into `self`; `other`'s values win.
    ///
    /// Removal tokens in `other` delete rather than set:
    ///
    /// | Field | `-:` | `-:name` / `key=-:` |
    /// |-------|------|---------------------|
    /// | id | clears | clears if it equals `name` |
    /// | class | clears all classes | removes `name` |
    /// | attribute / directive / mark type | as a key: clears the map | as a value: deletes the key |
    ///
    /// An `other` without an id leaves the current id alone.
    pub fn update(&mut self, other: &AttributeSet) {
        match id_edit(other.id.as_deref()) {
            IdEdit::Keep => {}
            IdEdit::Set(id) => self.id = Some(id.to_owned()),
            IdEdit::Clear => self.id = None,
            IdEdit::ClearIfEquals(target) => {
                if self.id.as_deref() == Some(target) {
                    self.id = None;
                }
            }
        }

        for class in other.classes.iter() {
            match class_edit(class) {
                ClassEdit::Add(class) => {
                    self.classes.insert(class);
                }
                ClassEdit::Remove(class) => {
                    self.classes.remove(class);
                }
                ClassEdit::ClearAll => self.classes.clear(),
            }
        }

        apply_edits(
            &mut self.attributes,
            other.attributes.iter().map(|(k, v)| string_edit(k, v)),
        );
        apply_edits(
            &mut self.directives,
            other.directives.iter().map(|(k, v)| string_edit(k, v)),
        );
        apply_edits(
            &mut self.mark_types,
            other.mark_types.iter().map(|(k, v)| mark_type_edit(k, v)),
        );
    }

    /// Fill gaps in `self` from `other`; `self`'s own values win.
    ///
    /// Removal tokens are not interpreted.
    pub fn incorporate(&mut self, other: &AttributeSet) {
        if self.id.is_none() {
            self.id.clone_from(&other.id);
        }
        for class in other.classes.iter() {
            self.classes.insert(class);
        }
        self.attributes = underlay(&self.attributes, &other.attributes);
        self.directives = underlay(&self.directives, &other.directives);
        self.mark_types = underlay(&self.mark_types, &other.mark_types);
    }
}
