use crate::domain::{
    record::Identified,
    stage::LeadStage,
};
use serde::{Deserialize, Serialize};

/// A record that sits on a pipeline board
pub trait BoardRecord: Identified {
    fn stage(&self) -> LeadStage;
    fn set_stage(&mut self, stage: LeadStage);
}

/// Configuration for a kanban board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub stages: Vec<LeadStage>,
}

impl BoardConfig {
    pub fn new(name: impl Into<String>, stages: Vec<LeadStage>) -> Self {
        Self {
            name: name.into(),
            stages,
        }
    }

    /// Every stage, as shown on the leads page
    pub fn lead_pipeline() -> Self {
        Self::new("Leads", LeadStage::ALL.to_vec())
    }

    /// Proposal through Lost, as shown on the deals page
    pub fn deal_pipeline() -> Self {
        Self::new("Deals", LeadStage::DEAL_STAGES.to_vec())
    }

    pub fn has_stage(&self, stage: LeadStage) -> bool {
        self.stages.contains(&stage)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::lead_pipeline()
    }
}

/// One column of a rendered board
#[derive(Debug, Clone)]
pub struct Column<'a, R> {
    pub stage: LeadStage,
    pub label: &'static str,
    pub items: Vec<&'a R>,
}

impl<'a, R: Identified> Column<'a, R> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<crate::domain::RecordId> {
        self.items.iter().map(|r| r.id()).collect()
    }
}

/// Columns derived from a record collection
#[derive(Debug, Clone)]
pub struct BoardView<'a, R> {
    pub columns: Vec<Column<'a, R>>,
    /// Records whose stage has no column on this board
    pub unplaced: Vec<&'a R>,
}

impl<'a, R> BoardView<'a, R> {
    pub fn column(&self, stage: LeadStage) -> Option<&Column<'a, R>> {
        self.columns.iter().find(|c| c.stage == stage)
    }
}

/// Groups records into one column per configured stage.
///
/// Columns follow the configured stage order; items keep the order they
/// have in `records`. Stages without records still get an (empty) column.
pub fn build_columns<'a, R, I>(records: I, config: &BoardConfig) -> BoardView<'a, R>
where
    R: BoardRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut columns: Vec<Column<'a, R>> = config
        .stages
        .iter()
        .map(|&stage| Column {
            stage,
            label: stage.as_str(),
            items: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for record in records {
        match columns.iter_mut().find(|c| c.stage == record.stage()) {
            Some(column) => column.items.push(record),
            None => unplaced.push(record),
        }
    }

    BoardView { columns, unplaced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{lead::Lead, record::Owner, RecordId};

    fn lead(id: i64, stage: LeadStage) -> Lead {
        Lead::new(RecordId::new(id), format!("Lead {}", id), stage, Owner::default())
    }

    fn ids(view: &BoardView<'_, Lead>, stage: LeadStage) -> Vec<i64> {
        view.column(stage)
            .unwrap()
            .ids()
            .into_iter()
            .map(|id| id.value())
            .collect()
    }

    #[test]
    fn test_columns_follow_stage_order() {
        let leads = vec![lead(1, LeadStage::New), lead(2, LeadStage::Won)];
        let config = BoardConfig::new(
            "Test",
            vec![LeadStage::New, LeadStage::Contacted, LeadStage::Won],
        );

        let view = build_columns(&leads, &config);

        let stages: Vec<LeadStage> = view.columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, config.stages);
        assert_eq!(ids(&view, LeadStage::New), vec![1]);
        assert!(view.column(LeadStage::Contacted).unwrap().is_empty());
        assert_eq!(ids(&view, LeadStage::Won), vec![2]);
        assert!(view.unplaced.is_empty());
    }

    #[test]
    fn test_columns_partition_records() {
        let stages = LeadStage::ALL;
        let leads: Vec<Lead> = (0..30)
            .map(|i| lead(i, stages[(i as usize * 7 + 3) % stages.len()]))
            .collect();

        let view = build_columns(&leads, &BoardConfig::lead_pipeline());

        let mut seen: Vec<i64> = view
            .columns
            .iter()
            .flat_map(|c| c.ids())
            .map(|id| id.value())
            .collect();
        assert_eq!(seen.len(), leads.len());
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), leads.len());

        for column in &view.columns {
            assert!(column.items.iter().all(|l| l.stage == column.stage));
        }
    }

    #[test]
    fn test_items_keep_source_order() {
        let leads = vec![
            lead(5, LeadStage::Won),
            lead(1, LeadStage::New),
            lead(3, LeadStage::Won),
            lead(2, LeadStage::Won),
        ];

        let view = build_columns(&leads, &BoardConfig::lead_pipeline());
        assert_eq!(ids(&view, LeadStage::Won), vec![5, 3, 2]);
    }

    #[test]
    fn test_deterministic() {
        let leads = vec![lead(1, LeadStage::Lost), lead(2, LeadStage::Proposal)];
        let config = BoardConfig::deal_pipeline();

        let a: Vec<Vec<RecordId>> = build_columns(&leads, &config).columns.iter().map(|c| c.ids()).collect();
        let b: Vec<Vec<RecordId>> = build_columns(&leads, &config).columns.iter().map(|c| c.ids()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unconfigured_stage_is_unplaced() {
        let leads = vec![lead(1, LeadStage::New), lead(2, LeadStage::Won)];
        let view = build_columns(&leads, &BoardConfig::deal_pipeline());

        assert_eq!(view.columns.len(), 4);
        assert_eq!(view.unplaced.len(), 1);
        assert_eq!(view.unplaced[0].id, RecordId::new(1));
    }

    #[test]
    fn test_empty_collection_yields_empty_columns() {
        let leads: Vec<Lead> = Vec::new();
        let view = build_columns(&leads, &BoardConfig::lead_pipeline());
        assert_eq!(view.columns.len(), LeadStage::ALL.len());
        assert!(view.columns.iter().all(|c| c.is_empty()));
    }
}
