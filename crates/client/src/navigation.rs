//! Role → screen capability tables.
//!
//! The single place that says which panels each role gets and where a login
//! lands, mirroring the app's sidebars.

use courseforge_auth::Role;

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub route: &'static str,
}

const STUDENT_NAV: &[NavEntry] = &[
    NavEntry {
        label: "Dashboard",
        route: "/student",
    },
    NavEntry {
        label: "My Courses",
        route: "/student/my-courses",
    },
];

const INSTRUCTOR_NAV: &[NavEntry] = &[
    NavEntry {
        label: "Dashboard",
        route: "/instructor",
    },
    NavEntry {
        label: "My Courses",
        route: "/instructor/courses",
    },
];

const ADMIN_NAV: &[NavEntry] = &[
    NavEntry {
        label: "Dashboard",
        route: "/admin",
    },
    NavEntry {
        label: "Users",
        route: "/admin/users",
    },
    NavEntry {
        label: "Courses",
        route: "/admin/courses",
    },
];

/// The sidebar for a role.
pub fn navigation(role: Role) -> &'static [NavEntry] {
    match role {
        Role::Student => STUDENT_NAV,
        Role::Instructor => INSTRUCTOR_NAV,
        Role::Admin => ADMIN_NAV,
    }
}

/// Where a fresh login of this role lands.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Student => "/student",
        Role::Instructor => "/instructor",
        Role::Admin => "/admin",
    }
}
