//! Default phase and task template seeded into new projects

use crate::model::TaskRole;

pub struct TemplateTask {
    pub title: &'static str,
    pub role: TaskRole,
    pub estimated_days: i64,
    pub critical_path: bool,
}

pub struct TemplatePhase {
    pub name: &'static str,
    pub description: &'static str,
    pub tasks: &'static [TemplateTask],
}

const fn task(title: &'static str, role: TaskRole, estimated_days: i64, critical_path: bool) -> TemplateTask {
    TemplateTask {
        title,
        role,
        estimated_days,
        critical_path,
    }
}

pub const DEFAULT_TEMPLATE: &[TemplatePhase] = &[
    TemplatePhase {
        name: "Site Acquisition & Due Diligence",
        description: "Secure the land and confirm the site can be built on",
        tasks: &[
            task("Execute land purchase or lease", TaskRole::Owner, 30, true),
            task("Geotechnical survey", TaskRole::Engineer, 14, false),
            task("Environmental review", TaskRole::Engineer, 21, false),
        ],
    },
    TemplatePhase {
        name: "Permitting",
        description: "Zoning, building and electrical permits",
        tasks: &[
            task("Zoning approval", TaskRole::Owner, 45, true),
            task("Building permit submission", TaskRole::Engineer, 10, false),
            task("Electrical permit", TaskRole::Contractor, 14, false),
        ],
    },
    TemplatePhase {
        name: "Utility Interconnection",
        description: "Load study, interconnection agreement and energization date",
        tasks: &[
            task("Submit interconnection application", TaskRole::Owner, 5, true),
            task("Load flow study", TaskRole::Utility, 60, true),
            task("Sign interconnection agreement", TaskRole::Owner, 15, true),
        ],
    },
    TemplatePhase {
        name: "Site Preparation",
        description: "Grading, roads, drainage and foundations",
        tasks: &[
            task("Grading and drainage", TaskRole::Contractor, 20, false),
            task("Access road", TaskRole::Contractor, 10, false),
            task("Pour container pads", TaskRole::Contractor, 15, true),
        ],
    },
    TemplatePhase {
        name: "Electrical Infrastructure",
        description: "Substation, transformers and distribution",
        tasks: &[
            task("Procure transformers", TaskRole::Owner, 120, true),
            task("Substation construction", TaskRole::Contractor, 60, true),
            task("Medium-voltage distribution", TaskRole::Contractor, 30, false),
        ],
    },
    TemplatePhase {
        name: "Deployment & Commissioning",
        description: "Containers, miners, networking and energization",
        tasks: &[
            task("Set containers / cooling units", TaskRole::Contractor, 14, false),
            task("Install miners and networking", TaskRole::Contractor, 21, false),
            task("Utility energization", TaskRole::Utility, 5, true),
            task("Commissioning and hashrate validation", TaskRole::Engineer, 7, true),
        ],
    },
];

/// Default utility interconnection milestones, in order
pub const DEFAULT_UTILITY_MILESTONES: &[&str] = &[
    "Application submitted",
    "Load study complete",
    "Interconnection agreement signed",
    "Facilities construction",
    "Energization",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_critical_work_in_every_phase() {
        assert!(!DEFAULT_TEMPLATE.is_empty());
        for phase in DEFAULT_TEMPLATE {
            assert!(!phase.tasks.is_empty(), "{} has no tasks", phase.name);
            assert!(phase.tasks.iter().any(|t| t.critical_path), "{}", phase.name);
        }
    }
}
