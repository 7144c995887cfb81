//! Agent catalog commands.

use super::{Context, Output, json};
use crate::models::{AGENTS, Agent, Deck, Rarity, agent_by_id};
use crate::{Error, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct AgentSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub deck: Deck,
    pub rarity: Rarity,
    pub power_level: u8,
    pub collected: bool,
}

#[derive(Serialize)]
pub struct AgentList {
    pub count: usize,
    pub collected: usize,
    pub agents: Vec<AgentSummary>,
}

impl Output for AgentList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.agents.is_empty() {
            return "No agents match.".to_string();
        }
        let mut lines = vec![format!("{} agents ({} collected):", self.count, self.collected)];
        for agent in &self.agents {
            lines.push(format!(
                "  [{}] {} ({}) - {}, {} - power {}",
                if agent.collected { "x" } else { " " },
                agent.name,
                agent.id,
                agent.deck,
                agent.rarity,
                agent.power_level
            ));
        }
        lines.join("\n")
    }
}

pub fn agents_list(ctx: &Context, deck: Option<&str>, rarity: Option<&str>) -> Result<AgentList> {
    let deck = deck
        .map(|d| Deck::parse(d).ok_or_else(|| Error::InvalidInput(format!("Unknown deck: {}", d))))
        .transpose()?;
    let rarity = rarity
        .map(|r| Rarity::parse(r).ok_or_else(|| Error::InvalidInput(format!("Unknown rarity: {}", r))))
        .transpose()?;

    let store = ctx.progress();
    let agents: Vec<AgentSummary> = AGENTS
        .iter()
        .filter(|a| deck.is_none_or(|d| a.deck == d))
        .filter(|a| rarity.is_none_or(|r| a.rarity == r))
        .map(|a| AgentSummary {
            id: a.id,
            name: a.name,
            deck: a.deck,
            rarity: a.rarity,
            power_level: a.stats.power_level,
            collected: store.is_collected(a.id),
        })
        .collect();

    Ok(AgentList {
        count: agents.len(),
        collected: agents.iter().filter(|a| a.collected).count(),
        agents,
    })
}

#[derive(Serialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: Agent,
    pub rarity_color: &'static str,
    pub collected: bool,
}

impl Output for AgentDetail {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let a = &self.agent;
        let mut lines = vec![
            format!("{} {} ({})", a.icon, a.name, a.id),
            format!("{} | {} | {}", a.role, a.deck, a.rarity),
            a.description.to_string(),
            format!(
                "Saves {} and {} | complexity {}/5 | power {}",
                a.stats.time_saved, a.stats.money_saved, a.stats.complexity, a.stats.power_level
            ),
            format!("Collected: {}", if self.collected { "yes" } else { "no" }),
            String::new(),
            "Prompt:".to_string(),
        ];
        lines.extend(a.prompt.lines().map(|l| format!("  {}", l)));
        lines.join("\n")
    }
}

pub fn agents_show(ctx: &Context, id: &str) -> Result<AgentDetail> {
    let agent = agent_by_id(id).ok_or_else(|| Error::NotFound(format!("Agent {}", id)))?;
    Ok(AgentDetail {
        agent: *agent,
        rarity_color: agent.rarity.hex(),
        collected: ctx.progress().is_collected(id),
    })
}
