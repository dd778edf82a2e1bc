use crate::math::mesh::TriangleMesh;

/// Precomputed water surfaces, one per stage, and the stage on display.
pub struct StageSet {
    meshes: Vec<TriangleMesh>,
    current: usize,
}

impl StageSet {
    /// `None` when there are no stages to show.
    pub fn new(meshes: Vec<TriangleMesh>) -> Option<Self> {
        if meshes.is_empty() {
            return None;
        }
        Some(Self { meshes, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn mesh(&self, stage: usize) -> Option<&TriangleMesh> {
        self.meshes.get(stage)
    }

    pub fn meshes(&self) -> &[TriangleMesh] {
        &self.meshes
    }

    pub fn contains(&self, stage: i64) -> bool {
        stage >= 0 && (stage as u64) < self.meshes.len() as u64
    }

    /// Moves to `stage`, returning the `(old, new)` pair, or `None` when out of range.
    pub fn goto(&mut self, stage: i64) -> Option<(usize, usize)> {
        if !self.contains(stage) {
            return None;
        }
        let old = self.current;
        self.current = stage as usize;
        Some((old, self.current))
    }

    pub fn label(&self) -> String {
        format!("Stage {} of {}", self.current + 1, self.meshes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn stages(n: usize) -> StageSet {
        let meshes = (0..n)
            .map(|_| TriangleMesh::from_positions(&[Vec3::ZERO, Vec3::X, Vec3::Z], vec![0, 2, 1]))
            .collect();
        StageSet::new(meshes).unwrap()
    }

    #[test]
    fn starts_at_first_stage() {
        let s = stages(5);
        assert_eq!(s.current(), 0);
        assert_eq!(s.label(), "Stage 1 of 5");
    }

    #[test]
    fn goto_in_range() {
        let mut s = stages(5);
        assert_eq!(s.goto(4), Some((0, 4)));
        assert_eq!(s.label(), "Stage 5 of 5");
        assert_eq!(s.goto(4), Some((4, 4)));
    }

    #[test]
    fn goto_out_of_range_changes_nothing() {
        let mut s = stages(5);
        s.goto(2);
        assert_eq!(s.goto(5), None);
        assert_eq!(s.goto(-1), None);
        assert_eq!(s.current(), 2);
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(StageSet::new(Vec::new()).is_none());
    }
}
