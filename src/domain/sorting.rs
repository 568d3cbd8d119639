use crate::domain::{
    board::BoardRecord,
    lead::{Deal, Lead},
    stage::LeadStage,
    task::Task,
};
use std::cmp::Ordering;
use std::str::FromStr;

/// Read access to the fields pipeline records are sorted by
pub trait PipelineFields: BoardRecord {
    fn name(&self) -> &str;
    fn value(&self) -> f64;
    fn score(&self) -> Option<u32>;
}

impl PipelineFields for Lead {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn score(&self) -> Option<u32> {
        self.score
    }
}

impl PipelineFields for Deal {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn score(&self) -> Option<u32> {
        self.score
    }
}

/// Fields available for sorting leads and deals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Value,
    Stage,
    Score,
}

/// Fields available for sorting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Due,
    Priority,
    Title,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "value" => Ok(SortField::Value),
            "stage" => Ok(SortField::Stage),
            "score" => Ok(SortField::Score),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: id, name, value, stage, score",
                s
            )),
        }
    }
}

impl FromStr for TaskSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "due" => Ok(TaskSortField::Due),
            "priority" => Ok(TaskSortField::Priority),
            "title" => Ok(TaskSortField::Title),
            _ => Err(format!(
                "Invalid task sort field '{}'. Valid fields: due, priority, title",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

fn directed(cmp: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => cmp,
        SortOrder::Descending => cmp.reverse(),
    }
}

/// Sorts leads or deals in-place.
///
/// Records without a score always sort after scored ones, whatever the
/// direction. The sort is stable, so ties keep their current order.
///
/// # Examples
/// ```
/// use crm_core::domain::sorting::{sort_records, SortField, SortOrder};
/// use crm_core::domain::{Lead, LeadStage, Owner, RecordId};
///
/// let mut leads = vec![
///     Lead::new(RecordId::new(1), "Beta", LeadStage::Won, Owner::default()),
///     Lead::new(RecordId::new(2), "alpha", LeadStage::New, Owner::default()),
/// ];
///
/// sort_records(&mut leads, SortField::Name, SortOrder::Ascending);
/// assert_eq!(leads[0].name, "alpha");
/// ```
pub fn sort_records<R: PipelineFields>(records: &mut [R], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| match field {
        SortField::Id => directed(a.id().cmp(&b.id()), order),
        SortField::Name => directed(
            a.name().to_lowercase().cmp(&b.name().to_lowercase()),
            order,
        ),
        SortField::Value => directed(
            a.value().partial_cmp(&b.value()).unwrap_or(Ordering::Equal),
            order,
        ),
        SortField::Stage => directed(compare_stage(&a.stage(), &b.stage()), order),
        SortField::Score => compare_option_scores(a.score(), b.score(), order),
    });
}

/// Sorts tasks in-place
pub fn sort_tasks(tasks: &mut [Task], field: TaskSortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let cmp = match field {
            TaskSortField::Due => a.due_date.cmp(&b.due_date),
            TaskSortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            TaskSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        directed(cmp, order)
    });
}

/// Compare stages by pipeline progression
///
/// Stage order: New → Contacted → Proposal → Negotiation → Won → Lost
fn compare_stage(a: &LeadStage, b: &LeadStage) -> Ordering {
    a.position().cmp(&b.position())
}

/// Missing scores go last in both directions
fn compare_option_scores(a: Option<u32>, b: Option<u32>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
