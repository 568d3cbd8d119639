//! Dashboard figures, reports and the contact detail view.
//!
//! The summaries are plain functions over loaded records; the `load`
//! helpers fetch what they need from the remote store concurrently.

use crate::{
    domain::{Contact, Deal, Lead, LeadStage, RecordId, Task},
    error::Result,
    remote::{get_as, list_as, ListQuery, RemoteStore, Table},
};
use log::error;
use serde::Serialize;

/// Number of open tasks listed on the dashboard
pub const UPCOMING_TASKS: usize = 3;

/// Count of leads per source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

/// Headline numbers shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub new_leads: usize,
    pub deals_won: usize,
    pub open_tasks: usize,
    pub lead_sources: Vec<SourceCount>,
    pub upcoming: Vec<Task>,
}

impl DashboardStats {
    /// Summarises the given records; tasks are expected in due-date order
    pub fn compute(leads: &[Lead], deals: &[Deal], tasks: &[Task]) -> Self {
        Self {
            total_revenue: deals.iter().map(|d| d.value).sum(),
            new_leads: leads.len(),
            deals_won: deals.iter().filter(|d| d.stage == LeadStage::Won).count(),
            open_tasks: tasks.iter().filter(|t| t.is_open()).count(),
            lead_sources: lead_sources(leads),
            upcoming: upcoming_tasks(tasks, UPCOMING_TASKS),
        }
    }

    /// Fetches leads, deals and tasks concurrently and summarises them
    pub async fn load(remote: &dyn RemoteStore) -> Result<Self> {
        let lead_query = ListQuery::all(Table::Leads);
        let deal_query = ListQuery::all(Table::Deals);
        let task_query = ListQuery::all(Table::Tasks);
        let (leads, deals, tasks) = tokio::try_join!(
            list_as::<Lead>(remote, Table::Leads, &lead_query),
            list_as::<Deal>(remote, Table::Deals, &deal_query),
            list_as::<Task>(remote, Table::Tasks, &task_query),
        )
        .map_err(|err| {
            error!("Failed to load dashboard: {}", err);
            err
        })?;

        Ok(Self::compute(&leads, &deals, &tasks))
    }
}

/// Leads per source, in the order each source first appears
pub fn lead_sources(leads: &[Lead]) -> Vec<SourceCount> {
    let mut counts: Vec<SourceCount> = Vec::new();
    for lead in leads {
        match counts.iter_mut().find(|c| c.source == lead.source) {
            Some(entry) => entry.count += 1,
            None => counts.push(SourceCount {
                source: lead.source.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// The first `limit` tasks that are not completed
pub fn upcoming_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    tasks.iter().filter(|t| t.is_open()).take(limit).cloned().collect()
}

/// Deals and revenue attributed to one owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerPerformance {
    pub name: String,
    pub deals: usize,
    pub revenue: f64,
}

/// Per-owner deal counts and revenue, in the order owners first appear
pub fn team_performance(deals: &[Deal]) -> Vec<OwnerPerformance> {
    let mut team: Vec<OwnerPerformance> = Vec::new();
    for deal in deals {
        match team.iter_mut().find(|m| m.name == deal.owner.name) {
            Some(member) => {
                member.deals += 1;
                member.revenue += deal.value;
            }
            None => team.push(OwnerPerformance {
                name: deal.owner.name.clone(),
                deals: 1,
                revenue: deal.value,
            }),
        }
    }
    team
}

/// How many leads were won, lost, or are still open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadConversion {
    pub won: usize,
    pub lost: usize,
    pub in_progress: usize,
}

impl LeadConversion {
    pub fn total(&self) -> usize {
        self.won + self.lost + self.in_progress
    }
}

pub fn lead_conversion(leads: &[Lead]) -> LeadConversion {
    leads
        .iter()
        .fold(LeadConversion::default(), |mut acc, lead| {
            match lead.stage {
                LeadStage::Won => acc.won += 1,
                LeadStage::Lost => acc.lost += 1,
                _ => acc.in_progress += 1,
            }
            acc
        })
}

/// Both reports, computed from one fetch of leads and deals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
    pub team: Vec<OwnerPerformance>,
    pub conversion: LeadConversion,
}

impl Reports {
    pub async fn load(remote: &dyn RemoteStore) -> Result<Self> {
        let lead_query = ListQuery::all(Table::Leads);
        let deal_query = ListQuery::all(Table::Deals);
        let (leads, deals) = tokio::try_join!(
            list_as::<Lead>(remote, Table::Leads, &lead_query),
            list_as::<Deal>(remote, Table::Deals, &deal_query),
        )?;

        Ok(Self {
            team: team_performance(&deals),
            conversion: lead_conversion(&leads),
        })
    }
}

/// A contact together with the deals and tasks that reference it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDetails {
    pub contact: Contact,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
}

impl ContactDetails {
    /// Fetches the contact and its related records concurrently.
    ///
    /// A contact that does not exist is `RecordNotFound`.
    pub async fn load(remote: &dyn RemoteStore, id: RecordId) -> Result<Self> {
        let deal_query = ListQuery::for_contact(Table::Deals, id);
        let task_query = ListQuery::for_contact(Table::Tasks, id);
        let (contact, deals, tasks) = tokio::try_join!(
            get_as::<Contact>(remote, Table::Contacts, id),
            list_as::<Deal>(remote, Table::Deals, &deal_query),
            list_as::<Task>(remote, Table::Tasks, &task_query),
        )?;

        Ok(Self {
            contact,
            deals,
            tasks,
        })
    }

    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(|t| t.is_open())
    }

    pub fn pipeline_value(&self) -> f64 {
        self.deals.iter().map(|d| d.value).sum()
    }
}
