/// Contribution calendar plus the repositories the user touched, most recently
/// updated first. GitHub caps `first` at 100.
pub const CONTRIBUTIONS_QUERY: &str = r#"
query($username: String!) {
    user(login: $username) {
        repositoriesContributedTo(
            first: 100,
            contributionTypes: [COMMIT, ISSUE, PULL_REQUEST, REPOSITORY],
            orderBy: { field: UPDATED_AT, direction: DESC }
        ) {
            totalCount
            nodes {
                nameWithOwner
                url
                updatedAt
            }
        }
        contributionsCollection {
            contributionCalendar {
                totalContributions
                weeks {
                    contributionDays {
                        contributionCount
                        date
                    }
                }
            }
        }
    }
}
"#;
