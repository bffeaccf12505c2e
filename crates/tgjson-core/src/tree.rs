//! Folder tree built during ingestion and flattened once at the end.
//!
//! Folders live in an arena; each slot keeps its children as indices in
//! first-insertion order. Slot 0 is the root and holds the top-level
//! testcases.

use crate::record::{FolderNode, ReportNode, TestRecord};

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct FolderSlot {
    name: String,
    records: Vec<TestRecord>,
    children: Vec<usize>,
}

/// Outcome of [`FolderTree::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    /// A top-level record with the same name already exists.
    Duplicate,
}

#[derive(Debug)]
pub struct FolderTree {
    slots: Vec<FolderSlot>,
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderTree {
    pub fn new() -> Self {
        Self {
            slots: vec![FolderSlot::default()],
        }
    }

    /// Insert `record` under `folder_key` (`a/b/c`), or at top level when
    /// the key is `None` or has no segments.
    ///
    /// Every key segment is materialized as its own node, even if the same
    /// string appears elsewhere in the tree.
    pub fn insert(&mut self, folder_key: Option<&str>, record: TestRecord) -> Insertion {
        let segments: Vec<&str> = folder_key
            .map(|key| key.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if segments.is_empty() {
            let top = &mut self.slots[ROOT].records;
            if top.iter().any(|r| r.name == record.name) {
                return Insertion::Duplicate;
            }
            top.push(record);
            return Insertion::Inserted;
        }

        let mut current = ROOT;
        for segment in segments {
            current = self.child_or_create(current, segment);
        }
        self.slots[current].records.push(record);
        Insertion::Inserted
    }

    fn child_or_create(&mut self, parent: usize, name: &str) -> usize {
        if let Some(&idx) = self.slots[parent]
            .children
            .iter()
            .find(|&&idx| self.slots[idx].name == name)
        {
            return idx;
        }

        let idx = self.slots.len();
        self.slots.push(FolderSlot {
            name: name.to_string(),
            ..FolderSlot::default()
        });
        self.slots[parent].children.push(idx);
        idx
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        self.slots.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of folder nodes (the root is not a folder).
    pub fn folder_count(&self) -> usize {
        self.slots.len() - 1
    }

    /// Top-level records in insertion order.
    pub fn top_level(&self) -> &[TestRecord] {
        &self.slots[ROOT].records
    }

    /// Convert into the output node list.
    ///
    /// Top-level folders come first, then top-level testcases. Inside a
    /// folder its own testcases come first, then its subfolders, each in
    /// first-insertion order.
    pub fn into_nodes(mut self) -> Vec<ReportNode> {
        let children = std::mem::take(&mut self.slots[ROOT].children);
        let top_level = std::mem::take(&mut self.slots[ROOT].records);

        let mut nodes: Vec<ReportNode> = children
            .into_iter()
            .map(|idx| ReportNode::Folder(self.take_folder(idx)))
            .collect();
        nodes.extend(top_level.into_iter().map(ReportNode::Testcase));
        nodes
    }

    fn take_folder(&mut self, idx: usize) -> FolderNode {
        let slot = std::mem::take(&mut self.slots[idx]);

        let mut testcases: Vec<ReportNode> =
            slot.records.into_iter().map(ReportNode::Testcase).collect();
        for child in slot.children {
            testcases.push(ReportNode::Folder(self.take_folder(child)));
        }

        FolderNode {
            name: slot.name,
            testcases,
        }
    }
}
