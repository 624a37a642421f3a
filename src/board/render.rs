//! Plain-text rendering for boards and the project dashboard.

use crate::models::{Priority, Project, ProjectSummary, Task};

const HIGH: char = '▲';
const MEDIUM: char = '●';
const LOW: char = '▽';

fn priority_symbol(priority: Priority) -> char {
    match priority {
        Priority::High => HIGH,
        Priority::Medium => MEDIUM,
        Priority::Low => LOW,
    }
}

/// Render a project board, one column after another.
///
/// Example output:
/// ```text
/// Launch (Internal)
///
/// Backlog (2)
/// ├── ▲ Ship installer  [1/3]  Mar 05
/// └── ● Write docs  💬 2
///
/// Done (0)
/// ```
pub fn render_board(project: &Project) -> String {
    let mut output = format!("{} ({})\n", project.name, project.kind.label());

    for column in &project.columns {
        output.push('\n');
        output.push_str(&format!("{} ({})\n", column.name, column.tasks.len()));
        for (i, task) in column.tasks.iter().enumerate() {
            let is_last = i == column.tasks.len() - 1;
            output.push_str(if is_last { "└── " } else { "├── " });
            render_card(&mut output, task);
            output.push('\n');
        }
    }
    output
}

fn render_card(output: &mut String, task: &Task) {
    output.push(priority_symbol(task.priority));
    output.push(' ');
    output.push_str(&task.title);

    let (done, total) = task.checklist_progress();
    if total > 0 {
        output.push_str(&format!("  [{}/{}]", done, total));
    }
    if task.comments_count > 0 {
        output.push_str(&format!("  💬 {}", task.comments_count));
    }
    if let Some(due) = task.due_date {
        output.push_str(&format!("  {}", due.format("%b %d")));
    }
}

/// Totals shown above the project list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_tasks: usize,
    /// Projects with at least one task.
    pub active_projects: usize,
}

impl DashboardStats {
    pub fn from_summaries(projects: &[ProjectSummary]) -> Self {
        Self {
            total_projects: projects.len(),
            total_tasks: projects.iter().map(|p| p.task_count).sum(),
            active_projects: projects.iter().filter(|p| p.task_count > 0).count(),
        }
    }
}

/// Render the dashboard: totals, then one line per project.
pub fn render_dashboard(projects: &[ProjectSummary]) -> String {
    let stats = DashboardStats::from_summaries(projects);
    let mut output = format!(
        "Projects: {}  Tasks: {}  Active: {}\n",
        stats.total_projects, stats.total_tasks, stats.active_projects
    );

    if projects.is_empty() {
        output.push_str("\nNo projects yet.\n");
        return output;
    }

    output.push('\n');
    let width = projects.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    for project in projects {
        output.push_str(&format!(
            "{}  {:<width$}  {:<15}  {} {}\n",
            project.id,
            project.name,
            project.kind.label(),
            project.task_count,
            if project.task_count == 1 { "task" } else { "tasks" },
            width = width,
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::{Checklist, ChecklistItem, Column, ProjectType};

    fn task(title: &str, priority: Priority) -> Task {
        Task {
            id: Uuid::new_v4(),
            column_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            position: 0,
            priority,
            due_date: None,
            created_at: Utc::now(),
            updated_at: None,
            checklists: Vec::new(),
            comments: Vec::new(),
            comments_count: 0,
        }
    }

    fn column(name: &str, tasks: Vec<Task>) -> Arc<Column> {
        Arc::new(Column {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            name: name.to_string(),
            position: 0,
            created_at: Utc::now(),
            tasks,
        })
    }

    fn summary(name: &str, kind: ProjectType, task_count: usize) -> ProjectSummary {
        ProjectSummary {
            id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            kind,
            archived: false,
            created_at: Utc::now(),
            task_count,
        }
    }

    #[test]
    fn test_empty_board() {
        let project = Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: None,
            kind: ProjectType::Internal,
            archived: false,
            created_at: Utc::now(),
            updated_at: None,
            columns: vec![column("Backlog", vec![]), column("Done", vec![])],
        };
        assert_eq!(
            render_board(&project),
            "Launch (Internal)\n\nBacklog (0)\n\nDone (0)\n"
        );
    }

    #[test]
    fn test_cards_with_details() {
        let mut installer = task("Ship installer", Priority::High);
        installer.due_date = Some(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap());
        installer.checklists = vec![Checklist {
            id: Uuid::new_v4(),
            task_id: installer.id,
            title: "Release".to_string(),
            position: 0,
            created_at: Utc::now(),
            items: [true, false, false]
                .iter()
                .enumerate()
                .map(|(i, &completed)| ChecklistItem {
                    id: Uuid::new_v4(),
                    checklist_id: Uuid::nil(),
                    content: format!("step {}", i),
                    completed,
                    position: i as i32,
                    created_at: Utc::now(),
                })
                .collect(),
        }];
        let mut docs = task("Write docs", Priority::Medium);
        docs.comments_count = 2;

        let project = Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: None,
            kind: ProjectType::Internal,
            archived: false,
            created_at: Utc::now(),
            updated_at: None,
            columns: vec![column("Backlog", vec![installer, docs, task("Tidy", Priority::Low)])],
        };

        let expected = "Launch (Internal)\n\nBacklog (3)\n\
                        ├── ▲ Ship installer  [1/3]  Mar 05\n\
                        ├── ● Write docs  💬 2\n\
                        └── ▽ Tidy\n";
        assert_eq!(render_board(&project), expected);
    }

    #[test]
    fn test_dashboard_stats() {
        let projects = vec![
            summary("Launch", ProjectType::Internal, 3),
            summary("Acme site", ProjectType::Client, 0),
            summary("Dark mode", ProjectType::FeatureRequest, 1),
        ];
        assert_eq!(
            DashboardStats::from_summaries(&projects),
            DashboardStats {
                total_projects: 3,
                total_tasks: 4,
                active_projects: 2,
            }
        );
    }

    #[test]
    fn test_dashboard_lines() {
        let projects = vec![
            summary("Launch", ProjectType::Internal, 1),
            summary("Acme site", ProjectType::Client, 0),
        ];
        let output = render_dashboard(&projects);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Projects: 2  Tasks: 1  Active: 1");
        assert!(lines[2].contains("Launch     Internal"));
        assert!(lines[2].ends_with("1 task"));
        assert!(lines[3].contains("Acme site  Client Project"));
        assert!(lines[3].ends_with("0 tasks"));
    }

    #[test]
    fn test_empty_dashboard() {
        assert_eq!(
            render_dashboard(&[]),
            "Projects: 0  Tasks: 0  Active: 0\n\nNo projects yet.\n"
        );
    }
}
