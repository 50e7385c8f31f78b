use super::ProcessRecord;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ProcessNode {
    pub record: ProcessRecord,
    pub children: Vec<ProcessNode>,
}

/// Parent/child forest built from one poll. Roots and siblings are ordered by pid.
#[derive(Debug, Clone, Default)]
pub struct ProcessTree {
    roots: Vec<ProcessNode>,
    len: usize,
}

impl ProcessTree {
    pub fn build(records: Vec<ProcessRecord>) -> Self {
        let mut by_pid: HashMap<i32, ProcessRecord> = HashMap::with_capacity(records.len());
        for record in records {
            by_pid.insert(record.pid, record);
        }
        let len = by_pid.len();

        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        for record in by_pid.values() {
            if record.ppid != record.pid {
                children.entry(record.ppid).or_default().push(record.pid);
            }
        }
        for kids in children.values_mut() {
            kids.sort_unstable();
        }

        let mut root_pids: Vec<i32> = by_pid
            .values()
            .filter(|r| r.ppid == r.pid || !by_pid.contains_key(&r.ppid))
            .map(|r| r.pid)
            .collect();
        root_pids.sort_unstable();

        let mut roots = Vec::with_capacity(root_pids.len());
        for pid in root_pids {
            if let Some(node) = take_subtree(pid, &mut by_pid, &children) {
                roots.push(node);
            }
        }

        // Whatever is left only hangs off a parent cycle.
        loop {
            let Some(pid) = by_pid.keys().min().copied() else {
                break;
            };
            if let Some(node) = take_subtree(pid, &mut by_pid, &children) {
                roots.push(node);
            }
        }

        Self { roots, len }
    }

    pub fn roots(&self) -> &[ProcessNode] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pre-order walk over every record in the forest.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        let mut stack: Vec<&ProcessNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(&node.record)
        })
    }

    #[cfg(test)]
    pub fn filter<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a ProcessRecord> + 'a {
        self.iter().filter(move |r| r.matches(query))
    }

    #[cfg(test)]
    pub fn contains(&self, pid: i32) -> bool {
        self.iter().any(|r| r.pid == pid)
    }
}

fn take_subtree(
    pid: i32,
    by_pid: &mut HashMap<i32, ProcessRecord>,
    children: &HashMap<i32, Vec<i32>>,
) -> Option<ProcessNode> {
    let record = by_pid.remove(&pid)?;
    let kids = match children.get(&pid) {
        Some(kids) => kids
            .iter()
            .filter_map(|child| take_subtree(*child, by_pid, children))
            .collect(),
        None => Vec::new(),
    };
    Some(ProcessNode { record, children: kids })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: i32, ppid: i32, name: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid,
            name: name.into(),
            user: "root".into(),
            ..Default::default()
        }
    }

    fn root_pids(tree: &ProcessTree) -> Vec<i32> {
        tree.roots().iter().map(|n| n.record.pid).collect()
    }

    #[test]
    fn records_with_absent_parent_become_roots() {
        let tree = ProcessTree::build(vec![
            proc(1, 0, "systemd"),
            proc(2, 0, "kthreadd"),
            proc(50, 1, "sshd"),
            proc(900, 777, "orphan"),
            proc(51, 50, "bash"),
        ]);

        assert_eq!(root_pids(&tree), vec![1, 2, 900]);
        for node in tree.roots() {
            assert!(!tree.contains(node.record.ppid));
        }
    }

    #[test]
    fn children_are_nested_under_their_parent() {
        let tree = ProcessTree::build(vec![
            proc(51, 50, "bash"),
            proc(1, 0, "systemd"),
            proc(60, 1, "cron"),
            proc(50, 1, "sshd"),
        ]);

        let init = &tree.roots()[0];
        let kids: Vec<i32> = init.children.iter().map(|n| n.record.pid).collect();
        assert_eq!(kids, vec![50, 60]);
        assert_eq!(init.children[0].children[0].record.name, "bash");
    }

    #[test]
    fn every_record_appears_once_even_with_a_parent_cycle() {
        let tree = ProcessTree::build(vec![
            proc(1, 0, "systemd"),
            proc(10, 11, "a"),
            proc(11, 10, "b"),
            proc(12, 11, "c"),
            proc(7, 7, "self"),
        ]);

        let mut pids: Vec<i32> = tree.iter().map(|r| r.pid).collect();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 7, 10, 11, 12]);
        assert_eq!(tree.len(), 5);
        assert_eq!(root_pids(&tree), vec![1, 7, 10]);
    }

    #[test]
    fn iter_is_pre_order() {
        let tree = ProcessTree::build(vec![
            proc(1, 0, "systemd"),
            proc(3, 1, "b"),
            proc(2, 1, "a"),
            proc(4, 2, "a-child"),
        ]);
        let order: Vec<i32> = tree.iter().map(|r| r.pid).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
    }

    #[test]
    fn filter_returns_only_matching_records() {
        let tree = ProcessTree::build(vec![
            proc(1, 0, "systemd"),
            proc(200, 1, "firefox"),
            proc(201, 200, "firefox-bin"),
            proc(300, 1, "bash"),
        ]);

        let hits: Vec<&ProcessRecord> = tree.filter("FIRE").collect();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.name.contains("firefox")));
        assert_eq!(tree.filter("").count(), 4);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = ProcessTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert!(!tree.contains(1));
    }
}
