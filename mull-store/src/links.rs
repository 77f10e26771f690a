//! Relationship maintenance
//!
//! `relates` is kept symmetric and `blocks`/`needs` as complementary pairs
//! by writing both matter files. There is no multi-file transaction, so the
//! first file's bytes are snapshotted and restored if the second write
//! fails. `parent` is one-way and touches a single file.

use crate::error::{Result, StoreError};
use crate::matter::{Matter, RelationType};
use crate::repository::MatterStore;

#[derive(Clone, Copy)]
enum Edit {
    Add,
    Remove,
}

impl Edit {
    /// Apply to one side; true when the list changed
    fn apply(self, list: &mut Vec<String>, target: &str) -> bool {
        let present = list.iter().any(|id| id == target);
        match (self, present) {
            (Edit::Add, false) => {
                list.push(target.to_string());
                true
            }
            (Edit::Remove, true) => {
                list.retain(|id| id != target);
                true
            }
            _ => false,
        }
    }
}

impl MatterStore {
    /// Record `a <rel> b`, writing the counterpart on `b` where the
    /// relation has one. Linking an existing relation is a no-op.
    pub fn link(&self, a: &str, rel: RelationType, b: &str) -> Result<()> {
        if rel == RelationType::Parent {
            let mut child = self.get(a)?;
            if !self.exists(b)? {
                return Err(StoreError::not_found(b));
            }
            if child.parent.as_deref() == Some(b) {
                return Ok(());
            }
            child.parent = Some(b.to_string());
            child.touch();
            return self.write(&child);
        }
        self.edit_pair(a, rel, b, Edit::Add)
    }

    /// Remove `a <rel> b` and its counterpart. Removing an absent relation
    /// is a no-op.
    pub fn unlink(&self, a: &str, rel: RelationType, b: &str) -> Result<()> {
        if rel == RelationType::Parent {
            let mut child = self.get(a)?;
            if child.parent.as_deref() != Some(b) {
                return Ok(());
            }
            child.parent = None;
            child.touch();
            return self.write(&child);
        }
        self.edit_pair(a, rel, b, Edit::Remove)
    }

    /// Strip `id` from every matter that references it. Returns how many
    /// matters were rewritten.
    pub fn remove_all_references(&self, id: &str) -> Result<usize> {
        let mut cleaned = 0;
        for mut matter in self.list(&Default::default())? {
            if matter.strip_references(id) {
                matter.touch();
                self.write(&matter)?;
                cleaned += 1;
            }
        }
        log::debug!("removed references to {} from {} matters", id, cleaned);
        Ok(cleaned)
    }

    fn edit_pair(&self, a: &str, rel: RelationType, b: &str, edit: Edit) -> Result<()> {
        let Some(inverse) = rel.inverse() else {
            return Err(StoreError::InvalidRelationType(rel.to_string()));
        };

        let mut first = self.get(a)?;
        if a == b {
            let changed = edit_side(&mut first, rel, b, edit) | edit_side(&mut first, inverse, a, edit);
            if changed {
                first.touch();
                self.write(&first)?;
            }
            return Ok(());
        }

        let mut second = self.get(b)?;
        let write_first = edit_side(&mut first, rel, b, edit);
        let write_second = edit_side(&mut second, inverse, a, edit);
        if !write_first && !write_second {
            return Ok(());
        }

        let snapshot = self.backend().read(&first.filename)?;
        if write_first {
            first.touch();
            self.write(&first)?;
        }

        if write_second {
            second.touch();
            if let Err(e) = self.write(&second) {
                log::warn!("write of {} failed, restoring {}", b, a);
                if let Err(restore) = self.backend().write(&first.filename, &snapshot) {
                    log::error!("restoring {} failed: {}", first.filename, restore);
                }
                return Err(StoreError::linking_failed(a, e));
            }
        }
        Ok(())
    }
}

fn edit_side(matter: &mut Matter, rel: RelationType, target: &str, edit: Edit) -> bool {
    match matter.relation_mut(rel) {
        Some(list) => edit.apply(list, target),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, FsBackend};
    use crate::config::StoreConfig;
    use crate::matter::MatterMeta;
    use std::io;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, MatterStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = MatterStore::open(StoreConfig::new(temp_dir.path())).unwrap();
        (temp_dir, store)
    }

    fn pair(store: &MatterStore) -> (String, String) {
        let a = store.create("Alpha", &MatterMeta::new()).unwrap();
        let b = store.create("Beta", &MatterMeta::new()).unwrap();
        (a.id, b.id)
    }

    /// Fails every write to a file whose name starts with `prefix`
    struct FailingBackend {
        inner: FsBackend,
        prefix: String,
    }

    impl Backend for FailingBackend {
        fn list(&self) -> io::Result<Vec<String>> {
            self.inner.list()
        }

        fn read(&self, name: &str) -> io::Result<Vec<u8>> {
            self.inner.read(name)
        }

        fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
            if name.starts_with(&self.prefix) {
                return Err(io::Error::other("disk full"));
            }
            self.inner.write(name, data)
        }

        fn remove(&self, name: &str) -> io::Result<()> {
            self.inner.remove(name)
        }
    }

    #[test]
    fn test_link_relates_symmetric() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);

        store.link(&a, RelationType::Relates, &b).unwrap();
        store.link(&a, RelationType::Relates, &b).unwrap();
        store.link(&b, RelationType::Relates, &a).unwrap();

        assert_eq!(store.get(&a).unwrap().relates, vec![b.clone()]);
        assert_eq!(store.get(&b).unwrap().relates, vec![a.clone()]);
    }

    #[test]
    fn test_link_blocks_sets_needs() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);

        store.link(&a, RelationType::Blocks, &b).unwrap();
        assert_eq!(store.get(&a).unwrap().blocks, vec![b.clone()]);
        assert_eq!(store.get(&b).unwrap().needs, vec![a.clone()]);

        store.unlink(&a, RelationType::Blocks, &b).unwrap();
        assert!(store.get(&a).unwrap().blocks.is_empty());
        assert!(store.get(&b).unwrap().needs.is_empty());
    }

    #[test]
    fn test_link_needs_sets_blocks() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);

        store.link(&a, RelationType::Needs, &b).unwrap();
        assert_eq!(store.get(&a).unwrap().needs, vec![b.clone()]);
        assert_eq!(store.get(&b).unwrap().blocks, vec![a.clone()]);
    }

    #[test]
    fn test_link_repairs_one_sided_state() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);
        let mut alpha = store.get(&a).unwrap();
        alpha.relates.push(b.clone());
        store.write(&alpha).unwrap();

        store.link(&a, RelationType::Relates, &b).unwrap();
        assert_eq!(store.get(&a).unwrap().relates, vec![b.clone()]);
        assert_eq!(store.get(&b).unwrap().relates, vec![a]);
    }

    #[test]
    fn test_link_parent() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);

        store.link(&a, RelationType::Parent, &b).unwrap();
        assert_eq!(store.get(&a).unwrap().parent, Some(b.clone()));
        assert_eq!(store.get(&b).unwrap().parent, None);

        let before = store.read_raw(&a).unwrap();
        store.link(&a, RelationType::Parent, &b).unwrap();
        assert_eq!(store.read_raw(&a).unwrap(), before);

        // unlinking a different parent leaves the current one
        store.unlink(&a, RelationType::Parent, "zzzz").unwrap();
        assert_eq!(store.get(&a).unwrap().parent, Some(b.clone()));
        store.unlink(&a, RelationType::Parent, &b).unwrap();
        assert_eq!(store.get(&a).unwrap().parent, None);
    }

    #[test]
    fn test_link_missing_target_writes_nothing() {
        let (_temp_dir, store) = setup_store();
        let (a, _b) = pair(&store);
        let before = store.read_raw(&a).unwrap();

        let err = store.link(&a, RelationType::Blocks, "zzzz").unwrap_err();
        assert!(err.is_not_found());
        let err = store.link(&a, RelationType::Parent, "zzzz").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.read_raw(&a).unwrap(), before);
    }

    #[test]
    fn test_unlink_absent_is_noop() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);
        let before_a = store.read_raw(&a).unwrap();
        let before_b = store.read_raw(&b).unwrap();

        store.unlink(&a, RelationType::Relates, &b).unwrap();

        assert_eq!(store.read_raw(&a).unwrap(), before_a);
        assert_eq!(store.read_raw(&b).unwrap(), before_b);
    }

    #[test]
    fn test_link_rollback_on_failed_second_write() {
        let (temp_dir, store) = setup_store();
        let (a, b) = pair(&store);
        let before = store.read_raw(&a).unwrap();

        let config = StoreConfig::new(temp_dir.path());
        let failing = MatterStore::with_backend(
            config.clone(),
            FailingBackend {
                inner: FsBackend::open(config.matters_path()).unwrap(),
                prefix: format!("{b}-"),
            },
        );

        let err = failing.link(&a, RelationType::Blocks, &b).unwrap_err();
        assert_eq!(err.kind(), "linking_failed");
        assert!(err.to_string().contains("disk full"));

        assert_eq!(store.read_raw(&a).unwrap(), before);
        assert!(store.get(&b).unwrap().needs.is_empty());
    }

    #[test]
    fn test_unlink_rollback_on_failed_second_write() {
        let (temp_dir, store) = setup_store();
        let (a, b) = pair(&store);
        store.link(&a, RelationType::Relates, &b).unwrap();
        let before = store.read_raw(&a).unwrap();

        let config = StoreConfig::new(temp_dir.path());
        let failing = MatterStore::with_backend(
            config.clone(),
            FailingBackend {
                inner: FsBackend::open(config.matters_path()).unwrap(),
                prefix: format!("{b}-"),
            },
        );

        let err = failing.unlink(&a, RelationType::Relates, &b).unwrap_err();
        assert_eq!(err.kind(), "linking_failed");
        assert_eq!(store.read_raw(&a).unwrap(), before);
    }

    #[test]
    fn test_self_link_blocks() {
        let (_temp_dir, store) = setup_store();
        let (a, _b) = pair(&store);

        store.link(&a, RelationType::Blocks, &a).unwrap();
        let got = store.get(&a).unwrap();
        assert_eq!(got.blocks, vec![a.clone()]);
        assert_eq!(got.needs, vec![a]);
    }

    #[test]
    fn test_remove_all_references() {
        let (_temp_dir, store) = setup_store();
        let (a, b) = pair(&store);
        let c = store.create("Gamma", &MatterMeta::new()).unwrap().id;
        store.link(&a, RelationType::Relates, &b).unwrap();
        store.link(&c, RelationType::Blocks, &b).unwrap();
        store.link(&c, RelationType::Parent, &b).unwrap();

        store.delete(&b).unwrap();
        assert_eq!(store.remove_all_references(&b).unwrap(), 2);

        let alpha = store.get(&a).unwrap();
        assert!(alpha.relates.is_empty());
        let gamma = store.get(&c).unwrap();
        assert!(gamma.blocks.is_empty());
        assert_eq!(gamma.parent, None);
        assert_eq!(store.remove_all_references(&b).unwrap(), 0);
    }
}
