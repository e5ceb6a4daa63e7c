//! Team membership resolution for active requirements.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::api::{list_team_members, ApiResult, RepositoryApi};
use crate::error::ApiError;
use crate::model::TeamMembership;
use crate::owner::TeamRef;
use crate::requirement::LabelRequirement;

/// Distinct teams referenced by the given requirements.
pub fn referenced_teams<'a, I>(requirements: I) -> BTreeSet<TeamRef>
where
    I: IntoIterator<Item = &'a LabelRequirement>,
{
    requirements
        .into_iter()
        .flat_map(LabelRequirement::teams)
        .cloned()
        .collect()
}

/// Fetch the members of every team referenced by `active`, one concurrent
/// listing per distinct team. Any failed listing fails the whole resolution.
pub async fn resolve_teams(
    api: &dyn RepositoryApi,
    active: &[&LabelRequirement],
) -> ApiResult<TeamMembership> {
    let teams = referenced_teams(active.iter().copied());
    if teams.is_empty() {
        return Ok(TeamMembership::new());
    }

    debug!("Loading {} teams", teams.len());
    let fetches = teams.into_iter().map(|team| async move {
        let members = list_team_members(api, &team).await?;
        debug!(team = %team, members = members.len(), "loaded team");
        Ok::<_, ApiError>((team, members.into_iter().collect::<BTreeSet<_>>()))
    });
    let membership: TeamMembership = try_join_all(fetches).await?.into_iter().collect();
    info!(teams = membership.len(), "Loaded teams");

    Ok(membership)
}
