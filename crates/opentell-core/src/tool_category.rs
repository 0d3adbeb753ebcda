/// Semantic category a build/test/lint tool belongs to, used by the
/// tool-signal detector to decide which substitutions are comparable
/// (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    PackageManager,
    TestFramework,
    E2eTesting,
    Linter,
    Formatter,
    UiFramework,
    MetaFramework,
    ServerFramework,
    BackendService,
    Database,
    Orm,
    CssFramework,
}

/// Classify the leading token of a shell command by semantic kind, in the
/// shape of a provider's tool-name classifier: a flat match over known
/// names rather than a structural parse.
pub fn classify_tool(token: &str) -> Option<ToolCategory> {
    match token.to_lowercase().as_str() {
        "npm" | "pnpm" | "yarn" | "bun" | "pip" | "pip3" | "poetry" | "cargo" => {
            Some(ToolCategory::PackageManager)
        }
        "jest" | "vitest" | "mocha" | "pytest" | "tap" | "ava" => Some(ToolCategory::TestFramework),
        "playwright" | "cypress" | "puppeteer" => Some(ToolCategory::E2eTesting),
        "eslint" | "ruff" | "clippy" | "pylint" | "flake8" => Some(ToolCategory::Linter),
        "prettier" | "rustfmt" | "black" | "gofmt" => Some(ToolCategory::Formatter),
        "react" | "vue" | "svelte" | "solid" => Some(ToolCategory::UiFramework),
        "next" | "nuxt" | "remix" | "astro" => Some(ToolCategory::MetaFramework),
        "express" | "fastify" | "koa" | "actix" | "axum" => Some(ToolCategory::ServerFramework),
        "redis-server" | "rabbitmq" | "kafka" => Some(ToolCategory::BackendService),
        "psql" | "mysql" | "sqlite3" | "mongosh" => Some(ToolCategory::Database),
        "prisma" | "drizzle" | "sequelize" | "diesel" => Some(ToolCategory::Orm),
        "tailwindcss" | "sass" | "postcss" => Some(ToolCategory::CssFramework),
        _ => None,
    }
}

/// Known package managers, used for the package-manager substitution rule
/// directly (distinct names may collide with a broader category match).
pub const PACKAGE_MANAGERS: &[&str] = &["npm", "pnpm", "yarn", "bun"];

/// Known test runners, used for the test-runner substitution rule.
pub const TEST_RUNNERS: &[&str] = &["jest", "vitest", "mocha", "pytest"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_tools() {
        assert_eq!(classify_tool("pnpm"), Some(ToolCategory::PackageManager));
        assert_eq!(classify_tool("vitest"), Some(ToolCategory::TestFramework));
        assert_eq!(classify_tool("unknown-tool"), None);
    }
}
