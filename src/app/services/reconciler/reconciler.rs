//! Create/update/skip decisions for normalized rows

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use super::decisions::{Decision, Reconciliation};
use super::staging::StagedStore;
use crate::Result;
use crate::app::models::{Assignment, Grade, Student, Tag};
use crate::app::services::layout_classifier::AssignmentColumn;
use crate::app::services::row_normalizer::{NormalizedRow, NormalizedUpload};
use crate::app::store::GradeStore;
use crate::constants::SCORE_EPSILON;

/// Reconciles normalized uploads against a grade store
pub struct EntityReconciler<'s, S: GradeStore + ?Sized> {
    store: &'s S,
    now: DateTime<Utc>,
    tags: Vec<String>,
}

/// How an assignment column resolved against stored assignments
#[derive(Debug, Clone, Copy)]
enum ColumnState {
    Ready { max_points: u32 },
    Conflict { stored_max_points: u32 },
}

/// Tags to attach to assignments created by this upload
#[derive(Debug, Default)]
struct TagPlan {
    /// Final spelling of every tag, existing or new
    names: Vec<String>,
    /// Tags that do not exist yet
    pending: Vec<Tag>,
    staged: bool,
}

impl<'s, S: GradeStore + ?Sized> EntityReconciler<'s, S> {
    /// Create a reconciler stamping grades with `now`
    pub fn new(store: &'s S, now: DateTime<Utc>) -> Self {
        Self {
            store,
            now,
            tags: Vec::new(),
        }
    }

    /// Tag names attached to assignments this upload creates
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Reconcile every row of `upload`, in file order
    ///
    /// Returns the change set and decisions without writing anything. Only
    /// store failures are errors; row and cell problems become decisions.
    pub fn reconcile(
        &self,
        upload: &NormalizedUpload,
        progress: Option<&ProgressBar>,
    ) -> Result<Reconciliation> {
        let mut staged = StagedStore::new(self.store);
        let mut tag_plan = self.plan_tags(&staged)?;
        let mut columns: Vec<Option<ColumnState>> = vec![None; upload.assignments.len()];
        let mut outcome = Reconciliation::default();

        for row in &upload.rows {
            self.reconcile_student(&mut staged, row, &mut outcome.decisions)?;

            for cell in &row.scores {
                let column = &upload.assignments[cell.assignment];
                let state = match columns[cell.assignment] {
                    Some(state) => state,
                    None => {
                        let state = self.resolve_assignment(
                            &mut staged,
                            column,
                            &mut tag_plan,
                            &mut outcome.decisions,
                        )?;
                        columns[cell.assignment] = Some(state);
                        state
                    }
                };

                match state {
                    ColumnState::Ready { max_points } => {
                        self.reconcile_grade(
                            &mut staged,
                            row,
                            column,
                            cell.score,
                            max_points,
                            &mut outcome.decisions,
                        )?;
                    }
                    ColumnState::Conflict { stored_max_points } => {
                        debug!(
                            "Row {}: skipping {} for {}, stored max points {} differ from {}",
                            row.row, column.key, row.email, stored_max_points, column.max_points
                        );
                        outcome.decisions.push(Decision::Conflict {
                            row: row.row,
                            index: column.index,
                            column: column.header.clone(),
                            email: row.email.clone(),
                            stored_max_points,
                            incoming_max_points: column.max_points,
                        });
                    }
                }
            }

            outcome.processed_rows += 1;
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        outcome.changes = staged.into_change_set();
        info!(
            "Reconciled {} rows into {}",
            outcome.processed_rows,
            outcome.changes.summary()
        );
        Ok(outcome)
    }

    /// Resolve tag names against existing tags, de-duplicating by case
    fn plan_tags(&self, staged: &StagedStore<'_, S>) -> Result<TagPlan> {
        let mut plan = TagPlan::default();
        let mut seen = Vec::new();

        for name in &self.tags {
            let lookup = Tag::lookup_key(name);
            if lookup.is_empty() || seen.contains(&lookup) {
                continue;
            }
            seen.push(lookup);

            match staged.tag(name)? {
                Some(existing) => plan.names.push(existing.name),
                None => {
                    let tag = Tag::new(name);
                    plan.names.push(tag.name.clone());
                    plan.pending.push(tag);
                }
            }
        }

        Ok(plan)
    }

    /// Create the student or apply name corrections
    fn reconcile_student(
        &self,
        staged: &mut StagedStore<'_, S>,
        row: &NormalizedRow,
        decisions: &mut Vec<Decision>,
    ) -> Result<()> {
        let Some(existing) = staged.student(&row.email)? else {
            let mut student = Student::new(&row.email, &row.first_name, &row.last_name);
            student.student_number = row.student_number.clone();
            staged.stage_student(student);
            decisions.push(Decision::StudentCreated {
                row: row.row,
                email: row.email.clone(),
            });
            return Ok(());
        };

        let mut updated = existing.clone();
        let mut changes = Vec::new();

        if !row.first_name.is_empty() {
            updated.first_name = row.first_name.clone();
        }
        if !row.last_name.is_empty() {
            updated.last_name = row.last_name.clone();
        }
        if updated.display_name() != existing.display_name() {
            changes.push(format!(
                "name changed '{}' → '{}'",
                existing.display_name(),
                updated.display_name()
            ));
        } else if updated.first_name != existing.first_name
            || updated.last_name != existing.last_name
        {
            changes.push(format!(
                "name fields changed '{}' / '{}' → '{}' / '{}'",
                existing.first_name, existing.last_name, updated.first_name, updated.last_name
            ));
        }

        if let Some(number) = &row.student_number {
            if existing.student_number.as_ref() != Some(number) {
                changes.push(match &existing.student_number {
                    Some(previous) => {
                        format!("student number changed '{}' → '{}'", previous, number)
                    }
                    None => format!("student number set to '{}'", number),
                });
                updated.student_number = Some(number.clone());
            }
        }

        if updated != existing {
            debug!("Row {}: updating {} ({})", row.row, row.email, changes.join("; "));
            staged.stage_student(updated);
            decisions.push(Decision::StudentUpdated {
                row: row.row,
                email: row.email.clone(),
                change: changes.join("; "),
            });
        }

        Ok(())
    }

    /// Find or create the assignment behind a column
    fn resolve_assignment(
        &self,
        staged: &mut StagedStore<'_, S>,
        column: &AssignmentColumn,
        tag_plan: &mut TagPlan,
        decisions: &mut Vec<Decision>,
    ) -> Result<ColumnState> {
        if let Some(existing) = staged.assignment(&column.key)? {
            if existing.max_points == column.max_points {
                return Ok(ColumnState::Ready {
                    max_points: existing.max_points,
                });
            }
            warn!(
                "Assignment {} is stored with max points {}, upload has {}; keeping stored value",
                column.key, existing.max_points, column.max_points
            );
            return Ok(ColumnState::Conflict {
                stored_max_points: existing.max_points,
            });
        }

        if !tag_plan.staged {
            for tag in tag_plan.pending.drain(..) {
                decisions.push(Decision::TagCreated {
                    name: tag.name.clone(),
                });
                staged.stage_tag(tag);
            }
            tag_plan.staged = true;
        }

        let mut assignment = Assignment::new(&column.key, column.max_points);
        assignment.tags = tag_plan.names.iter().cloned().collect();

        debug!(
            "Creating assignment {} with max points {}",
            column.key, column.max_points
        );
        staged.stage_assignment(assignment);
        decisions.push(Decision::AssignmentCreated {
            key: column.key.clone(),
            max_points: column.max_points,
        });

        Ok(ColumnState::Ready {
            max_points: column.max_points,
        })
    }

    /// Insert, update or leave the grade for one score cell
    fn reconcile_grade(
        &self,
        staged: &mut StagedStore<'_, S>,
        row: &NormalizedRow,
        column: &AssignmentColumn,
        score: f64,
        max_points: u32,
        decisions: &mut Vec<Decision>,
    ) -> Result<()> {
        let decision = match staged.grade(&row.email, &column.key)? {
            Some(existing) if existing.has_score(score) => {
                decisions.push(Decision::GradeUnchanged {
                    row: row.row,
                    index: column.index,
                    column: column.header.clone(),
                    email: row.email.clone(),
                });
                return Ok(());
            }
            Some(existing) => Decision::GradeUpdated {
                row: row.row,
                index: column.index,
                column: column.header.clone(),
                email: row.email.clone(),
                previous: existing.score,
                score,
            },
            None => Decision::GradeCreated {
                row: row.row,
                index: column.index,
                column: column.header.clone(),
                email: row.email.clone(),
                score,
            },
        };

        staged.stage_grade(Grade {
            student_email: row.email.clone(),
            assignment: column.key.clone(),
            score,
            last_updated: self.now,
        });
        decisions.push(decision);

        if score > f64::from(max_points) + SCORE_EPSILON {
            warn!(
                "Row {}: score {} for {} exceeds max points {}",
                row.row, score, column.key, max_points
            );
            decisions.push(Decision::ScoreAboveMax {
                row: row.row,
                index: column.index,
                column: column.header.clone(),
                email: row.email.clone(),
                score,
                max_points,
            });
        }

        Ok(())
    }
}
