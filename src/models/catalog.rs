//! The static agent card catalog.
//!
//! Every collectible card is defined here at build time. The progression
//! store never validates ids against this list; consumers that need a
//! checked lookup use [`agent_by_id`].

use serde::Serialize;
use std::fmt;

/// Card rarity, ordered `Common < Rare < Epic < Legendary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Display color name.
    pub fn color(&self) -> &'static str {
        match self {
            Rarity::Common => "green",
            Rarity::Rare => "blue",
            Rarity::Epic => "purple",
            Rarity::Legendary => "gold",
        }
    }

    /// Display color as a hex string.
    pub fn hex(&self) -> &'static str {
        match self {
            Rarity::Common => "#10B981",
            Rarity::Rare => "#3B82F6",
            Rarity::Epic => "#8B5CF6",
            Rarity::Legendary => "#F59E0B",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The deck a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deck {
    DailyOps,
    DigitalOps,
    LifeSystems,
    Legendary,
}

impl Deck {
    pub const ALL: [Deck; 4] = [Deck::DailyOps, Deck::DigitalOps, Deck::LifeSystems, Deck::Legendary];

    /// Parse from a label or snake_case name, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "daily_ops" => Some(Deck::DailyOps),
            "digital_ops" => Some(Deck::DigitalOps),
            "life_systems" => Some(Deck::LifeSystems),
            "legendary" => Some(Deck::Legendary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Deck::DailyOps => "Daily Ops",
            Deck::DigitalOps => "Digital Ops",
            Deck::LifeSystems => "Life Systems",
            Deck::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Descriptive card statistics. Nothing here is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    pub time_saved: &'static str,
    pub money_saved: &'static str,
    /// 1 (trivial) to 5 (involved)
    pub complexity: u8,
    /// 0 to 100
    pub power_level: u8,
}

/// One collectible card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub deck: Deck,
    pub rarity: Rarity,
    pub stats: AgentStats,
    pub description: &'static str,
    /// Prompt text carried by the card; opaque to the store
    pub prompt: &'static str,
    pub icon: &'static str,
}

/// Find a card by id.
pub fn agent_by_id(id: &str) -> Option<&'static Agent> {
    AGENTS.iter().find(|agent| agent.id == id)
}

/// All cards in one deck, in catalog order.
pub fn agents_by_deck(deck: Deck) -> Vec<&'static Agent> {
    AGENTS.iter().filter(|agent| agent.deck == deck).collect()
}

const fn stats(
    time_saved: &'static str,
    money_saved: &'static str,
    complexity: u8,
    power_level: u8,
) -> AgentStats {
    AgentStats {
        time_saved,
        money_saved,
        complexity,
        power_level,
    }
}

pub static AGENTS: &[Agent] = &[
    // Daily Ops
    Agent {
        id: "morning_brief",
        name: "Morning Brief Agent",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Common,
        stats: stats("15 min/day", "$0", 1, 20),
        description: "Generates a concise morning briefing with weather, calendar, and top priorities.",
        prompt: "You are my Morning Brief Agent.\nReview my calendar, tasks, and the local weather.\nGenerate a concise 3-bullet summary of what I need to know today.\nHighlight any conflicts or urgent items.",
        icon: "☀️",
    },
    Agent {
        id: "meal_planner",
        name: "Meal Planner",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Common,
        stats: stats("1 hr/week", "$50/week", 2, 35),
        description: "Creates a weekly meal plan based on dietary preferences and available ingredients.",
        prompt: "You are my Meal Planner Agent.\nPlan 5 dinners for the upcoming week.\nDietary restrictions: [INSERT RESTRICTIONS].\nGoal: Healthy, under 30 mins to cook.\nOutput a shopping list sorted by aisle.",
        icon: "🍽️",
    },
    Agent {
        id: "grocery_list",
        name: "Grocery List Generator",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Common,
        stats: stats("30 min/week", "$20/week", 1, 25),
        description: "Organizes random items into a structured shopping list.",
        prompt: "You are my Grocery List Generator.\nTake this list of random items: [INSERT ITEMS].\nOrganize them by supermarket aisle (Produce, Dairy, Meat, Pantry).\nFlag any items that might be expensive or hard to find.",
        icon: "🛒",
    },
    Agent {
        id: "cleaning_coordinator",
        name: "Cleaning Coordinator",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Rare,
        stats: stats("1 hr/week", "$0", 3, 45),
        description: "Breaks down cleaning tasks into manageable daily chunks.",
        prompt: "You are my Cleaning Coordinator.\nI have 2 hours this weekend to clean.\nCreate a prioritized checklist of high-impact cleaning tasks.\nFocus on visible areas and hygiene.",
        icon: "🧹",
    },
    Agent {
        id: "maintenance_manager",
        name: "Maintenance Manager",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Rare,
        stats: stats("2 hrs/month", "$100/mo", 3, 50),
        description: "Tracks home maintenance schedules and reminds you of seasonal tasks.",
        prompt: "You are my Maintenance Manager.\nIt is currently [CURRENT MONTH].\nList the essential home maintenance tasks for this season.\nInclude filter changes, safety checks, and outdoor prep.",
        icon: "🔧",
    },
    Agent {
        id: "supplies_tracker",
        name: "Supplies Tracker",
        role: "Daily Ops",
        deck: Deck::DailyOps,
        rarity: Rarity::Common,
        stats: stats("15 min/week", "$10/mo", 1, 20),
        description: "Predicts when household supplies will run out.",
        prompt: "You are my Supplies Tracker.\nI bought [ITEM] on [DATE]. It usually lasts [DURATION].\nCalculate when I need to reorder.\nRemind me 1 week before.",
        icon: "📦",
    },
    // Digital Ops
    Agent {
        id: "email_triage",
        name: "Email Triage Specialist",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Rare,
        stats: stats("2 hrs/week", "$0", 3, 60),
        description: "Scans your inbox to identify high-priority messages and filter noise.",
        prompt: "You are my Email Triage Specialist.\nHere are the subject lines and senders of my unread emails: [INSERT LIST].\nIdentify the top 3 that require immediate action.\nExplain why they are urgent.",
        icon: "📧",
    },
    Agent {
        id: "email_drafter",
        name: "Email Drafter",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Rare,
        stats: stats("1 hr/week", "$0", 2, 55),
        description: "Drafts professional responses to common emails.",
        prompt: "You are my Email Drafter.\nDraft a polite but firm decline to this invitation: [INSERT EMAIL].\nKeep it under 3 sentences.\nOffer a future date to reconnect.",
        icon: "✍️",
    },
    Agent {
        id: "calendar_defender",
        name: "The Calendar Defender",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Epic,
        stats: stats("3 hrs/week", "$0", 4, 75),
        description: "Protects your deep work time and optimizes your schedule.",
        prompt: "You are The Calendar Defender.\nReview my schedule for next week.\nIdentify fragmented time blocks.\nPropose a rescheduled version that groups meetings and creates 2-hour deep work blocks.",
        icon: "🛡️",
    },
    Agent {
        id: "meeting_prep",
        name: "Meeting Prep Agent",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Rare,
        stats: stats("30 min/mtg", "$0", 3, 50),
        description: "Prepares briefings and research for upcoming meetings.",
        prompt: "You are my Meeting Prep Agent.\nI am meeting with [PERSON/COMPANY] about [TOPIC].\nResearch them and provide 3 key talking points.\nAnticipate 2 difficult questions they might ask.",
        icon: "🤝",
    },
    Agent {
        id: "admin_tracker",
        name: "Admin Tracker",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Rare,
        stats: stats("1 hr/week", "$20/mo", 3, 45),
        description: "Keeps track of forms, renewals, and bureaucratic tasks.",
        prompt: "You are my Admin Tracker.\nList the documents required for [TASK, e.g., Passport Renewal].\nCreate a step-by-step checklist with deadlines.",
        icon: "📂",
    },
    Agent {
        id: "subscription_auditor",
        name: "Subscription Auditor",
        role: "Digital Ops",
        deck: Deck::DigitalOps,
        rarity: Rarity::Common,
        stats: stats("15 min/mo", "$50/mo", 1, 30),
        description: "Identifies unused subscriptions and helps cancel them.",
        prompt: "You are my Subscription Auditor.\nReview this list of monthly charges: [INSERT LIST].\nFlag any that look like recurring subscriptions.\nDraft a cancellation email for [SERVICE].",
        icon: "💳",
    },
    // Life Systems
    Agent {
        id: "health_coordinator",
        name: "Health Coordinator",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Epic,
        stats: stats("1 hr/week", "$100/mo", 4, 70),
        description: "Manages appointments, records, and health metrics.",
        prompt: "You are my Health Coordinator.\nAnalyze my recent sleep and activity data: [INSERT DATA].\nSuggest 3 adjustments to improve energy levels.\nDraft a message to my doctor asking about [SYMPTOM].",
        icon: "❤️",
    },
    Agent {
        id: "medication_manager",
        name: "Medication Manager",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Rare,
        stats: stats("10 min/week", "$0", 2, 40),
        description: "Tracks prescriptions and supplements.",
        prompt: "You are my Medication Manager.\nCreate a schedule for these supplements: [LIST].\nCheck for any known interactions between them.",
        icon: "💊",
    },
    Agent {
        id: "wellness_tracker",
        name: "Wellness Tracker",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Rare,
        stats: stats("20 min/week", "$0", 2, 45),
        description: "Logs and visualizes wellness habits.",
        prompt: "You are my Wellness Tracker.\nI want to build a habit of [HABIT].\nDesign a simple tracking system I can use in my notes app.\nCreate a reward structure for hitting milestones.",
        icon: "🧘",
    },
    Agent {
        id: "connection_agent",
        name: "Connection Agent",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Epic,
        stats: stats("1 hr/week", "$0", 4, 65),
        description: "Reminds you to reach out to friends and family.",
        prompt: "You are my Connection Agent.\nIt has been 3 months since I spoke to [NAME].\nDraft a warm, low-pressure text to reconnect.\nSuggest a coffee meetup based on their location in [CITY].",
        icon: "💬",
    },
    Agent {
        id: "occasion_tracker",
        name: "Occasion Tracker",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Rare,
        stats: stats("30 min/mo", "$20/yr", 2, 40),
        description: "Reminds you of birthdays and anniversaries with gift ideas.",
        prompt: "You are my Occasion Tracker.\n[NAME]'s birthday is in 2 weeks. They like [INTERESTS].\nSuggest 3 unique gift ideas under $50.\nDraft a birthday card message.",
        icon: "🎁",
    },
    Agent {
        id: "network_nurturer",
        name: "Network Nurturer",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Epic,
        stats: stats("2 hrs/week", "$0", 4, 70),
        description: "Strategically manages your professional network.",
        prompt: "You are my Network Nurturer.\nI met [NAME] at [EVENT]. They work in [INDUSTRY].\nDraft a follow-up email to cement the connection.\nSuggest a relevant article I could send them.",
        icon: "🌐",
    },
    Agent {
        id: "recovery_aware_learner",
        name: "Recovery-Aware Learner",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Epic,
        stats: stats("2 hrs/week", "$0", 4, 75),
        description: "Optimizes your learning schedule based on your energy.",
        prompt: "You are my Recovery-Aware Learner.\nI am feeling [ENERGY LEVEL: High/Low].\nI need to learn about [TOPIC].\nCreate a study plan that matches my current state.",
        icon: "🧠",
    },
    Agent {
        id: "second_brain",
        name: "Second Brain",
        role: "Life Systems",
        deck: Deck::LifeSystems,
        rarity: Rarity::Epic,
        stats: stats("5 hrs/week", "$0", 5, 80),
        description: "Organizes and retrieves your knowledge.",
        prompt: "You are my Second Brain.\nI remember reading something about [TOPIC] last month.\nSearch my notes and summarize the key concepts.\nConnect this to [OTHER TOPIC].",
        icon: "🗂️",
    },
    // Legendary
    Agent {
        id: "the_conductor",
        name: "The Conductor",
        role: "Master",
        deck: Deck::Legendary,
        rarity: Rarity::Legendary,
        stats: stats("10 hrs/week", "$500/mo", 5, 100),
        description: "The master orchestrator of your entire Life OS.",
        prompt: "You are The Conductor.\nReview the outputs from my Calendar Defender, Meal Planner, and Task Manager.\nIdentify conflicts and synergies.\nCreate a master schedule for the week that balances all domains.",
        icon: "🎼",
    },
    Agent {
        id: "daily_briefing_commander",
        name: "Daily Briefing Commander",
        role: "Master",
        deck: Deck::Legendary,
        rarity: Rarity::Legendary,
        stats: stats("30 min/day", "$0", 5, 90),
        description: "Synthesizes all daily inputs into a single command view.",
        prompt: "You are the Daily Briefing Commander.\nCompile a \"State of the Union\" for my day.\nInclude: Top 3 priorities, Health status, Financial alerts, and Relationship reminders.\nFormat as a military briefing.",
        icon: "🎖️",
    },
    Agent {
        id: "weekly_review_overseer",
        name: "Weekly Review Overseer",
        role: "Master",
        deck: Deck::Legendary,
        rarity: Rarity::Legendary,
        stats: stats("2 hrs/week", "$100/week", 5, 95),
        description: "Conducts a deep retrospective of your week.",
        prompt: "You are the Weekly Review Overseer.\nReview my completed tasks and calendar from last week.\nCalculate my \"Efficiency Score.\"\nIdentify 3 areas for improvement next week.",
        icon: "📊",
    },
    Agent {
        id: "system_health_monitor",
        name: "System Health Monitor",
        role: "Master",
        deck: Deck::Legendary,
        rarity: Rarity::Legendary,
        stats: stats("Auto", "Auto", 5, 99),
        description: "Constantly checks for friction in your systems.",
        prompt: "You are the System Health Monitor.\nI felt overwhelmed on [DAY].\nAnalyze my inputs from that day.\nDiagnose the system failure (e.g., too many meetings, poor sleep, unclear tasks).\nPrescribe a system fix.",
        icon: "💓",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_size() {
        assert_eq!(AGENTS.len(), 24);
    }

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<&str> = AGENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), AGENTS.len());
    }

    #[test]
    fn test_stats_in_range() {
        for agent in AGENTS {
            assert!(
                (1..=5).contains(&agent.stats.complexity),
                "{} complexity out of range",
                agent.id
            );
            assert!(agent.stats.power_level <= 100, "{} power out of range", agent.id);
        }
    }

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn test_rarity_colors() {
        assert_eq!(Rarity::Common.color(), "green");
        assert_eq!(Rarity::Legendary.hex(), "#F59E0B");
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!(Rarity::parse("EPIC"), Some(Rarity::Epic));
        assert_eq!(Rarity::parse("mythic"), None);
    }

    #[test]
    fn test_deck_parse_accepts_labels() {
        assert_eq!(Deck::parse("Daily Ops"), Some(Deck::DailyOps));
        assert_eq!(Deck::parse("life-systems"), Some(Deck::LifeSystems));
        assert_eq!(Deck::parse("digital_ops"), Some(Deck::DigitalOps));
        assert_eq!(Deck::parse("nope"), None);
    }

    #[test]
    fn test_agent_by_id() {
        let agent = agent_by_id("calendar_defender").unwrap();
        assert_eq!(agent.name, "The Calendar Defender");
        assert_eq!(agent.rarity, Rarity::Epic);
        assert!(agent_by_id("unknown").is_none());
    }

    #[test]
    fn test_agents_by_deck() {
        assert_eq!(agents_by_deck(Deck::DailyOps).len(), 6);
        assert_eq!(agents_by_deck(Deck::DigitalOps).len(), 6);
        assert_eq!(agents_by_deck(Deck::LifeSystems).len(), 8);
        assert_eq!(agents_by_deck(Deck::Legendary).len(), 4);
    }

    #[test]
    fn test_legendary_deck_is_all_legendary() {
        assert!(
            agents_by_deck(Deck::Legendary)
                .iter()
                .all(|a| a.rarity == Rarity::Legendary)
        );
    }
}
