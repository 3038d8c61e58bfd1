// 📇 Member Registry - ordered roster + identifier index
//
// Members live in a Vec (insertion order, or the order of the last sort).
// The index maps the lowercased ID to the member's position and is kept in
// sync on every mutation that moves members around.

use super::member::{id_key, KindTag, Member, MembershipStatus, PerformanceRecord};
use crate::error::{GymError, Result};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemberRegistry {
    members: Vec<Member>,
    index: HashMap<String, usize>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // CORE OPERATIONS
    // ========================================================================

    /// Append a member. Duplicate IDs (case-insensitive) are rejected and
    /// leave the registry unchanged.
    pub fn add(&mut self, member: Member) -> Result<()> {
        let key = id_key(member.id());
        if self.index.contains_key(&key) {
            return Err(GymError::DuplicateId(member.id().to_string()));
        }

        debug!(id = member.id(), "member added");
        self.index.insert(key, self.members.len());
        self.members.push(member);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Member> {
        self.index.get(&id_key(id)).map(|&pos| &self.members[pos])
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Member> {
        match self.index.get(&id_key(id)) {
            Some(&pos) => self.members.get_mut(pos),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&id_key(id))
    }

    /// Remove a member. Returns false when the ID is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.index.remove(&id_key(id)) else {
            return false;
        };

        let removed = self.members.remove(pos);
        debug!(id = removed.id(), "member deleted");

        // Everything after the removed slot shifted down by one
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        true
    }

    pub fn list(&self) -> &[Member] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.index.clear();
    }

    // ========================================================================
    // IN-PLACE UPDATES
    // ========================================================================

    fn require_mut(&mut self, id: &str) -> Result<&mut Member> {
        self.find_by_id_mut(id)
            .ok_or_else(|| GymError::NotFound(id.trim().to_string()))
    }

    pub fn set_status(&mut self, id: &str, status: MembershipStatus) -> Result<()> {
        let member = self.require_mut(id)?;
        member.set_status(status);
        debug!(id = member.id(), status = status.as_str(), "status updated");
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        self.require_mut(id)?.set_name(name)
    }

    pub fn set_trainer_fee(&mut self, id: &str, fee: f64) -> Result<()> {
        self.require_mut(id)?.set_trainer_fee(fee)
    }

    pub fn add_performance(&mut self, id: &str, record: PerformanceRecord) -> Result<()> {
        let member = self.require_mut(id)?;
        member.add_performance(record);
        debug!(id = member.id(), month = record.month(), year = record.year(), "performance recorded");
        Ok(())
    }

    // ========================================================================
    // SEARCH & FILTER
    // ========================================================================

    /// Case-insensitive substring match on the full name
    pub fn find_by_name(&self, substring: &str) -> Vec<Member> {
        let needle = substring.trim().to_lowercase();
        self.members
            .iter()
            .filter(|m| m.name().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn filter_by_kind(&self, kind: KindTag) -> Vec<Member> {
        self.members
            .iter()
            .filter(|m| m.kind().tag() == kind)
            .cloned()
            .collect()
    }

    /// Members with at least one record for month/year matching `achieved`
    pub fn filter_by_performance(&self, month: u32, year: i32, achieved: bool) -> Vec<Member> {
        self.members
            .iter()
            .filter(|m| m.had_performance(month, year, achieved))
            .cloned()
            .collect()
    }

    /// (regular, premium) head counts
    pub fn kind_counts(&self) -> (usize, usize) {
        let premium = self
            .members
            .iter()
            .filter(|m| m.kind().tag() == KindTag::Premium)
            .count();
        (self.members.len() - premium, premium)
    }

    // ========================================================================
    // SORTING (stable, in place)
    // ========================================================================

    pub fn sort_by_id(&mut self) {
        self.members.sort_by(|a, b| a.id().cmp(b.id()));
        self.reindex();
    }

    pub fn sort_by_name(&mut self) {
        self.members.sort_by_cached_key(|m| m.name().to_lowercase());
        self.reindex();
    }

    pub fn sort_by_join_date(&mut self) {
        self.members.sort_by_key(|m| m.join_date());
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .members
            .iter()
            .enumerate()
            .map(|(pos, m)| (id_key(m.id()), pos))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_registry() -> MemberRegistry {
        let mut registry = MemberRegistry::new();
        registry
            .add(Member::regular("M003", "charlie Brown", date(2022, 3, 1)).unwrap())
            .unwrap();
        registry
            .add(Member::premium("M001", "Alice Smith", date(2024, 1, 10), 20.0).unwrap())
            .unwrap();
        registry
            .add(Member::regular("M002", "Bob Stone", date(2023, 7, 4)).unwrap())
            .unwrap();
        registry
    }

    fn ids(registry: &MemberRegistry) -> Vec<&str> {
        registry.list().iter().map(|m| m.id()).collect()
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut registry = sample_registry();
        let before = registry.list().to_vec();

        let result = registry.add(Member::regular("m001", "Someone Else", date(2024, 2, 2)).unwrap());

        assert!(matches!(result, Err(GymError::DuplicateId(_))));
        assert_eq!(registry.list(), before.as_slice());
    }

    #[test]
    fn test_find_by_id_ignores_case() {
        let registry = sample_registry();
        assert_eq!(registry.find_by_id("m002").map(|m| m.name()), Some("Bob Stone"));
        assert!(registry.find_by_id("M999").is_none());
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let mut registry = sample_registry();

        assert!(!registry.delete("M999"));
        assert_eq!(registry.len(), 3);

        assert!(registry.delete("M003"));
        assert_eq!(ids(&registry), vec!["M001", "M002"]);

        // Index still points at the right members after the shift
        assert_eq!(registry.find_by_id("M002").map(|m| m.name()), Some("Bob Stone"));
        assert_eq!(registry.find_by_id("M001").map(|m| m.name()), Some("Alice Smith"));
        assert!(registry.find_by_id("M003").is_none());
    }

    #[test]
    fn test_sorts_are_stable_and_idempotent() {
        let mut registry = sample_registry();

        registry.sort_by_id();
        assert_eq!(ids(&registry), vec!["M001", "M002", "M003"]);

        registry.sort_by_name();
        let by_name = ids(&registry).into_iter().map(String::from).collect::<Vec<_>>();
        assert_eq!(by_name, vec!["M001", "M002", "M003"]);
        assert_eq!(registry.len(), 3);

        registry.sort_by_name();
        assert_eq!(ids(&registry), by_name);

        registry.sort_by_join_date();
        assert_eq!(ids(&registry), vec!["M003", "M002", "M001"]);
        assert_eq!(registry.find_by_id("M001").map(|m| m.id()), Some("M001"));
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut registry = MemberRegistry::new();
        registry.add(Member::regular("A", "zoe", date(2024, 1, 1)).unwrap()).unwrap();
        registry.add(Member::regular("B", "Adam", date(2024, 1, 1)).unwrap()).unwrap();
        registry.add(Member::regular("C", "bella", date(2024, 1, 1)).unwrap()).unwrap();

        registry.sort_by_name();
        assert_eq!(ids(&registry), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_name_keeps_ties_in_order() {
        let mut registry = MemberRegistry::new();
        registry.add(Member::regular("T2", "Sam Lee", date(2024, 1, 1)).unwrap()).unwrap();
        registry.add(Member::regular("T1", "amy", date(2024, 1, 1)).unwrap()).unwrap();
        registry.add(Member::regular("T3", "SAM LEE", date(2024, 1, 1)).unwrap()).unwrap();

        registry.sort_by_name();
        assert_eq!(ids(&registry), vec!["T1", "T2", "T3"]);
        assert_eq!(registry.find_by_id("t3").unwrap().name(), "SAM LEE");
    }

    #[test]
    fn test_search_and_filters() {
        let mut registry = sample_registry();
        registry
            .add_performance("M002", PerformanceRecord::new(5, 2024, true).unwrap())
            .unwrap();
        registry
            .add_performance("M001", PerformanceRecord::new(5, 2024, false).unwrap())
            .unwrap();

        let found = registry.find_by_name("STONE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "M002");

        assert_eq!(registry.filter_by_kind(KindTag::Premium).len(), 1);
        assert_eq!(registry.filter_by_kind(KindTag::Regular).len(), 2);
        assert_eq!(registry.kind_counts(), (2, 1));

        let achieved = registry.filter_by_performance(5, 2024, true);
        assert_eq!(achieved.len(), 1);
        assert_eq!(achieved[0].id(), "M002");
        assert!(registry.filter_by_performance(6, 2024, true).is_empty());
    }

    #[test]
    fn test_updates_report_not_found() {
        let mut registry = sample_registry();

        assert!(matches!(
            registry.set_status("nope", MembershipStatus::Frozen),
            Err(GymError::NotFound(_))
        ));
        assert!(registry.rename("M001", "  ").is_err());
        assert!(registry.set_trainer_fee("M002", 15.0).is_err());

        registry.set_status("m002", MembershipStatus::Frozen).unwrap();
        registry.rename("M001", "Alice Jones").unwrap();
        registry.set_trainer_fee("M001", 30.0).unwrap();

        assert_eq!(registry.find_by_id("M002").unwrap().status(), MembershipStatus::Frozen);
        let alice = registry.find_by_id("M001").unwrap();
        assert_eq!(alice.name(), "Alice Jones");
        assert_eq!(alice.kind().trainer_fee(), Some(30.0));
    }
}
