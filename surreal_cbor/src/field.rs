/***************************************************************************************************
 * Field Resolver
 *
 * Resolves an incoming CBOR map key to a struct field, per a fixed precedence: exact tag name,
 * case-folded tag name, exact (untagged) field name, case-folded (untagged) field name. Built
 * once per record type by the generated `CborDecode` impl and cached for the life of the process.
 *
 * Grounded on the process-wide, single-writer/many-reader cache the source crate keeps for its
 * own tag/field metadata (`tag.rs`'s `TagBuf`, generalized here into a dedicated cache keyed by
 * `TypeId` rather than by buffer contents).
 **************************************************************************************************/
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// One field as declared at the target type's definition site — the derive macro emits a static
/// slice of these per struct.
///
/// `path` is a depth-first index into the record's field list, flattened through any embedded
/// (flattened) sub-records — this is what lets an embedded record's fields resolve as if they
/// were declared on the outer record, with the outer record's same-named field taking precedence
/// (outer fields must be listed after their embedded sub-record's fields are expanded).
#[derive(Debug, Clone, Copy)]
pub struct FieldDeclaration {
    pub path: &'static [usize],
    pub tag_name: Option<&'static str>,
    pub field_name: &'static str,
}

/// One struct field's resolution metadata, owned so it can live in a process-wide cache.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub path: Vec<usize>,
    pub tag_name: Option<String>,
    pub field_name: &'static str,
}

impl From<&FieldDeclaration> for FieldDescriptor {
    fn from(d: &FieldDeclaration) -> Self {
        FieldDescriptor { path: d.path.to_vec(), tag_name: d.tag_name.map(str::to_string), field_name: d.field_name }
    }
}

/// Implemented by every `#[derive(CborDecode)]` struct so it can in turn be used as a
/// `#[cbor(flatten)]` field on some other record. `FIELDS` lists the type's own directly declared
/// fields only, one level deep — a struct used as a flatten target must not itself have flatten
/// fields of its own (§4.6's Open-Question resolution: single-level embedding only).
pub trait CborFields {
    const FIELDS: &'static [FieldDeclaration];
}

/// A record type's resolved lookup table.
#[derive(Debug, Default)]
pub struct FieldIndex {
    exact_tag: HashMap<String, FieldDescriptor>,
    folded_tag: HashMap<String, FieldDescriptor>,
    exact_field: HashMap<String, FieldDescriptor>,
    folded_field: HashMap<String, FieldDescriptor>,
}

impl FieldIndex {
    /// Build an index from the derive macro's static declaration list.
    pub fn build(fields: &[FieldDeclaration]) -> FieldIndex {
        let mut index = FieldIndex::default();
        for decl in fields {
            let descriptor = FieldDescriptor::from(decl);
            match decl.tag_name {
                Some(tag_name) if !tag_name.is_empty() && tag_name != "-" => {
                    index.exact_tag.entry(tag_name.to_string()).or_insert_with(|| descriptor.clone());
                    index.folded_tag.entry(tag_name.to_lowercase()).or_insert_with(|| descriptor.clone());
                }
                Some(_) => {
                    // Empty name or the "-" sentinel: the field is explicitly excluded from
                    // tag-based resolution, but untagged field-name resolution still applies.
                    index.exact_field.entry(decl.field_name.to_string()).or_insert_with(|| descriptor.clone());
                    index
                        .folded_field
                        .entry(decl.field_name.to_lowercase())
                        .or_insert_with(|| descriptor.clone());
                }
                None => {
                    index.exact_field.entry(decl.field_name.to_string()).or_insert_with(|| descriptor.clone());
                    index
                        .folded_field
                        .entry(decl.field_name.to_lowercase())
                        .or_insert_with(|| descriptor.clone());
                }
            }
        }
        index
    }

    /// Resolve a map key (§4.6's precedence: exact tag name, case-folded tag name, exact untagged
    /// field name, case-folded untagged field name). `None` means "unresolved" — not an error, the
    /// caller discards the value with `Cursor::skip_item`.
    pub fn resolve(&self, key: &str) -> Option<&FieldDescriptor> {
        self.exact_tag
            .get(key)
            .or_else(|| self.folded_tag.get(&key.to_lowercase()))
            .or_else(|| self.exact_field.get(key))
            .or_else(|| self.folded_field.get(&key.to_lowercase()))
    }
}

fn cache() -> &'static RwLock<HashMap<TypeId, Arc<FieldIndex>>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<FieldIndex>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Return the cached [`FieldIndex`] for `T`, building and inserting it on first use.
///
/// Guarded by a single reader-writer lock (§5): readers see a consistent snapshot, writers hold
/// the lock only long enough to insert on a cache miss. The cache is never invalidated — record
/// shapes are fixed at compile time.
pub fn index_for<T: 'static>(fields: &[FieldDeclaration]) -> Arc<FieldIndex> {
    let type_id = TypeId::of::<T>();
    if let Some(existing) = cache().read().unwrap().get(&type_id) {
        return existing.clone();
    }
    let mut guard = cache().write().unwrap();
    guard.entry(type_id).or_insert_with(|| Arc::new(FieldIndex::build(fields))).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_tag_beats_everything() {
        let decls = [
            FieldDeclaration { path: &[0], tag_name: Some("fieldname"), field_name: "FieldOne" },
            FieldDeclaration { path: &[1], tag_name: None, field_name: "fieldname" },
        ];
        let idx = FieldIndex::build(&decls);
        assert_eq!(idx.resolve("fieldname").unwrap().path, vec![0]);
    }

    #[test]
    fn case_folded_tag_match() {
        let decls = [FieldDeclaration { path: &[0], tag_name: Some("fieldname"), field_name: "Unused" }];
        let idx = FieldIndex::build(&decls);
        assert_eq!(idx.resolve("FIELDNAME").unwrap().path, vec![0]);
    }

    #[test]
    fn case_folded_field_name_only_for_untagged() {
        let decls = [FieldDeclaration { path: &[0], tag_name: None, field_name: "FieldName" }];
        let idx = FieldIndex::build(&decls);
        assert_eq!(idx.resolve("FIELDNAME").unwrap().path, vec![0]);
    }

    #[test]
    fn empty_and_dash_tag_names_fall_back_to_field_name() {
        let decls = [
            FieldDeclaration { path: &[0], tag_name: Some(""), field_name: "A" },
            FieldDeclaration { path: &[1], tag_name: Some("-"), field_name: "B" },
        ];
        let idx = FieldIndex::build(&decls);
        assert!(idx.resolve("").is_none());
        assert!(idx.resolve("-").is_none());
        assert_eq!(idx.resolve("A").unwrap().path, vec![0]);
        assert_eq!(idx.resolve("B").unwrap().path, vec![1]);
    }

    #[test]
    fn unresolved_key_is_none_not_error() {
        let idx = FieldIndex::default();
        assert!(idx.resolve("whatever").is_none());
    }

    #[test]
    fn embedded_fields_shadowed_by_outer_field_of_same_resolved_name() {
        // Embedded sub-record field listed first, outer record's same-named field listed second
        // — later entries win via `or_insert_with` only inserting on first-seen key, so outer
        // fields must come first in the declaration order for them to take precedence.
        let decls = [
            FieldDeclaration { path: &[1], tag_name: None, field_name: "name" }, // outer, listed first
            FieldDeclaration { path: &[0, 0], tag_name: None, field_name: "name" }, // embedded
        ];
        let idx = FieldIndex::build(&decls);
        assert_eq!(idx.resolve("name").unwrap().path, vec![1]);
    }
}
