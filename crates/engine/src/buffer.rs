use partition::PartitionId;
use schema::WriteBatch;
use std::collections::BTreeMap;

/// Pending writes of the key-value backend, grouped by partition.
///
/// Batches are kept unencoded and in arrival order; encoding happens once
/// per flush. Iteration is in partition-key order.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    map: BTreeMap<PartitionId, Vec<WriteBatch>>,
    approx_rows: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `batch` (already validated to hold `rows` rows) for `id`.
    pub fn push(&mut self, id: PartitionId, batch: WriteBatch, rows: usize) {
        self.map.entry(id).or_default().push(batch);
        self.approx_rows += rows;
    }

    /// Partitions with pending writes and their batches, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PartitionId, &[WriteBatch])> {
        self.map.iter().map(|(id, batches)| (id, batches.as_slice()))
    }

    /// Number of partitions with pending writes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rows accepted since the last clear.
    pub fn approx_rows(&self) -> usize {
        self.approx_rows
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.approx_rows = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partition::Partitioner;
    use schema::Row;

    fn id(table: &str, date: &str) -> PartitionId {
        Partitioner::default().partition_id(table, date).unwrap()
    }

    #[test]
    fn groups_batches_per_partition_in_order() {
        let mut buf = WriteBuffer::new();
        buf.push(id("NQ", "2025-06-14"), Row::new().with("a", 1i64).into(), 1);
        buf.push(id("ES", "2025-06-14"), Row::new().with("a", 2i64).into(), 1);
        buf.push(
            id("NQ", "2025-06-14"),
            vec![Row::new().with("a", 3i64), Row::new().with("a", 4i64)].into(),
            2,
        );

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.approx_rows(), 4);

        let ids: Vec<&str> = buf.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["ES/2025-06-14", "NQ/2025-06-14"]);

        let (_, nq) = buf.iter().nth(1).unwrap();
        assert_eq!(nq.len(), 2);
        assert_eq!(nq[1].row_count(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut buf = WriteBuffer::new();
        buf.push(id("ES", "2025-06-14"), Row::new().with("a", 1i64).into(), 1);
        assert!(!buf.is_empty());

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.approx_rows(), 0);
    }
}
