//! Member Linking
//!
//! Groups member numbers that belong to the same person, e.g. someone who
//! rejoined and was issued a new number. Groups only ever merge; a number that
//! was never linked is its own singleton group.

use std::collections::BTreeSet;

use crate::domain::MemberNumber;

/// Disjoint sets of member numbers.
///
/// Kept as a list of sets with linear scans; the number of linked members is
/// small enough that a parent-pointer forest would not pay for itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberLinking {
    groups: Vec<BTreeSet<MemberNumber>>,
}

impl MemberLinking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `numbers`, and every group any of them already belongs to, into
    /// one group. Linking numbers that are already grouped together changes
    /// nothing; an empty input is ignored.
    pub fn link<I>(&mut self, numbers: I)
    where
        I: IntoIterator<Item = MemberNumber>,
    {
        let incoming: BTreeSet<MemberNumber> = numbers.into_iter().collect();
        if incoming.len() < 2 {
            return;
        }

        if self.groups.iter().any(|group| incoming.is_subset(group)) {
            return;
        }

        let (touching, mut untouched): (Vec<_>, Vec<_>) = std::mem::take(&mut self.groups)
            .into_iter()
            .partition(|group| !group.is_disjoint(&incoming));

        let mut merged = incoming;
        for group in touching {
            merged.extend(group);
        }

        untouched.push(merged);
        self.groups = untouched;
    }

    /// Every number in the same group as `member_number`, itself included
    pub fn group_of(&self, member_number: MemberNumber) -> BTreeSet<MemberNumber> {
        self.groups
            .iter()
            .find(|group| group.contains(&member_number))
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([member_number]))
    }

    /// True when both numbers belong to one person
    pub fn are_linked(&self, a: MemberNumber, b: MemberNumber) -> bool {
        a == b || self.group_of(a).contains(&b)
    }

    /// Groups with more than one member
    pub fn groups(&self) -> &[BTreeSet<MemberNumber>] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(numbers: &[MemberNumber]) -> BTreeSet<MemberNumber> {
        numbers.iter().copied().collect()
    }

    #[test]
    fn test_unlinked_number_is_singleton() {
        let linking = MemberLinking::new();
        assert_eq!(linking.group_of(42), set(&[42]));
    }

    #[test]
    fn test_link_is_transitive() {
        let mut linking = MemberLinking::new();
        linking.link([1, 2]);
        linking.link([2, 3]);

        assert_eq!(linking.group_of(1), set(&[1, 2, 3]));
        assert_eq!(linking.group_of(3), set(&[1, 2, 3]));
        assert!(linking.are_linked(1, 3));
        assert_eq!(linking.groups().len(), 1);
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut linking = MemberLinking::new();
        linking.link([1, 2]);
        linking.link([5, 6]);
        let before = linking.clone();

        linking.link([1, 2]);
        linking.link([2]);
        assert_eq!(linking, before);
    }

    #[test]
    fn test_link_merges_existing_groups() {
        let mut linking = MemberLinking::new();
        linking.link([1, 2]);
        linking.link([3, 4]);
        linking.link([9, 10]);
        linking.link([2, 4, 7]);

        assert_eq!(linking.group_of(7), set(&[1, 2, 3, 4, 7]));
        assert_eq!(linking.group_of(9), set(&[9, 10]));
        assert_eq!(linking.groups().len(), 2);
    }

    #[test]
    fn test_groups_stay_disjoint() {
        let mut linking = MemberLinking::new();
        for pair in [[1, 2], [3, 4], [2, 3], [5, 6], [6, 1]] {
            linking.link(pair);
        }

        let groups = linking.groups();
        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                assert!(a.is_disjoint(b));
            }
        }
        assert_eq!(linking.group_of(5), set(&[1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_empty_link_is_ignored() {
        let mut linking = MemberLinking::new();
        linking.link(Vec::new());
        assert!(linking.groups().is_empty());
    }
}
