//! Per-user outcomes and the end-of-run summary

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use std::fmt;

/// Result of one step for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOutcome {
    /// Step has not run
    #[default]
    Pending,
    Done,
    /// The directory the step works on was missing
    Skipped,
    Failed,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepOutcome::Pending => "-",
            StepOutcome::Done => "done",
            StepOutcome::Skipped => "skipped",
            StepOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// How far a user has progressed through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserState {
    Unprocessed,
    CacheCleared,
    Copied,
    Linked,
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserState::Unprocessed => "unprocessed",
            UserState::CacheCleared => "cache cleared",
            UserState::Copied => "copied",
            UserState::Linked => "linked",
        };
        f.write_str(label)
    }
}

/// Step outcomes for one entry of the user list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReport {
    pub user: String,
    pub cache: StepOutcome,
    pub copy: StepOutcome,
    pub link: StepOutcome,
}

impl UserReport {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            cache: StepOutcome::Pending,
            copy: StepOutcome::Pending,
            link: StepOutcome::Pending,
        }
    }

    /// Latest state, in pipeline order, whose step completed
    ///
    /// Steps run independently, so a user can be `Linked` even though its
    /// cache step was skipped.
    pub fn state(&self) -> UserState {
        if self.link == StepOutcome::Done {
            UserState::Linked
        } else if self.copy == StepOutcome::Done {
            UserState::Copied
        } else if self.cache == StepOutcome::Done {
            UserState::CacheCleared
        } else {
            UserState::Unprocessed
        }
    }

    pub fn has_failure(&self) -> bool {
        [self.cache, self.copy, self.link].contains(&StepOutcome::Failed)
    }
}

/// Outcomes for a whole run, in user-list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub users: Vec<UserReport>,
}

impl RunReport {
    pub fn new(users: &[String]) -> Self {
        Self {
            users: users.iter().map(UserReport::new).collect(),
        }
    }

    pub fn linked(&self) -> usize {
        self.users
            .iter()
            .filter(|u| u.state() == UserState::Linked)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.users.iter().filter(|u| u.has_failure()).count()
    }

    /// One-line summary of the run
    pub fn summary_line(&self) -> String {
        format!(
            "Processed {} user(s): {} linked, {} with failures",
            self.users.len(),
            self.linked(),
            self.failed()
        )
    }

    /// Render the per-user table
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("User"),
            Cell::new("Cache"),
            Cell::new("Copy"),
            Cell::new("Link"),
            Cell::new("State"),
        ]);

        for user in &self.users {
            table.add_row(vec![
                Cell::new(&user.user),
                Cell::new(user.cache),
                Cell::new(user.copy),
                Cell::new(user.link),
                Cell::new(user.state()),
            ]);
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(cache: StepOutcome, copy: StepOutcome, link: StepOutcome) -> UserReport {
        UserReport {
            user: "alice".to_string(),
            cache,
            copy,
            link,
        }
    }

    #[test]
    fn test_state_follows_latest_completed_step() {
        use StepOutcome::*;

        assert_eq!(report(Pending, Pending, Pending).state(), UserState::Unprocessed);
        assert_eq!(report(Done, Failed, Skipped).state(), UserState::CacheCleared);
        assert_eq!(report(Done, Done, Failed).state(), UserState::Copied);
        assert_eq!(report(Skipped, Done, Done).state(), UserState::Linked);
    }

    #[test]
    fn test_counts() {
        use StepOutcome::*;

        let run = RunReport {
            users: vec![
                report(Done, Done, Done),
                report(Skipped, Skipped, Skipped),
                report(Failed, Done, Done),
            ],
        };

        assert_eq!(run.linked(), 2);
        assert_eq!(run.failed(), 1);
        assert_eq!(
            run.summary_line(),
            "Processed 3 user(s): 2 linked, 1 with failures"
        );
    }

    #[test]
    fn test_duplicate_users_get_own_rows() {
        let users = vec!["bob".to_string(), "bob".to_string()];
        let run = RunReport::new(&users);
        assert_eq!(run.users.len(), 2);

        let rendered = run.table().to_string();
        assert_eq!(rendered.matches("bob").count(), 2);
        assert!(rendered.contains("unprocessed"));
    }
}
