//! Player-facing battle reports.
//!
//! The engine only returns records; turning them into messages is the
//! caller's job. These helpers do it the way the turn pipeline would: one
//! summary message per participating player, plus a line-per-action
//! rendering for playback.

use battle_core::design::WeaponKind;
use battle_core::engine::BattleOutcome;
use battle_core::fleet::PlayerId;
use battle_core::record::{BattleAction, BattleRecord, PlayerRecord};
use serde::{Deserialize, Serialize};

/// A battle report addressed to one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleMessage {
    /// Recipient.
    pub player: PlayerId,
    /// One-line subject.
    pub subject: String,
    /// Report body, one line per entry.
    pub body: Vec<String>,
}

/// Render one action as a line of text.
#[must_use]
pub fn describe_action(action: &BattleAction) -> String {
    match action {
        BattleAction::Move { token, from, to } => {
            format!("Token {token} moved from {from} to {to}")
        }
        BattleAction::WeaponFire {
            kind,
            token,
            slot,
            target,
            damage,
            shield_damage,
            armor_damage,
            destroyed,
        } => {
            let weapon = match kind {
                WeaponKind::Beam => "beams",
                WeaponKind::Torpedo => "torpedoes",
            };
            let mut line = format!(
                "Token {token} fired {weapon} (slot {slot}) at token {target} for {damage} damage \
                 ({shield_damage} to shields, {armor_damage} to armor)"
            );
            if *destroyed > 0 {
                line.push_str(&format!(", destroying {destroyed}"));
            }
            line
        }
        BattleAction::Detonate {
            token,
            position,
            quantity,
        } => format!("Token {token} was destroyed at {position} ({quantity} ships lost)"),
        BattleAction::RanAway { token, position } => {
            format!("Token {token} disengaged from {position}")
        }
    }
}

/// Render a player's record round by round.
#[must_use]
pub fn describe_record(record: &PlayerRecord) -> Vec<String> {
    record
        .rounds()
        .flat_map(|(round, actions)| {
            std::iter::once(format!("Round {round}:"))
                .chain(actions.iter().map(|a| format!("  {}", describe_action(a))))
        })
        .collect()
}

fn ships_of(record: &BattleRecord, player: PlayerId) -> u32 {
    record
        .tokens
        .iter()
        .filter(|t| t.player == player)
        .fold(0, |total: u32, t| total.saturating_add(t.quantity))
}

/// One summary message per participating player.
#[must_use]
pub fn battle_messages(location: &str, outcome: &BattleOutcome) -> Vec<BattleMessage> {
    let record = &outcome.record;
    let stats = &record.stats;
    let total_lost = stats
        .ships_lost
        .values()
        .fold(0, |total: u32, n| total.saturating_add(*n));

    record
        .players
        .keys()
        .map(|&player| {
            let lost = stats.ships_lost.get(&player).copied().unwrap_or_default();
            let escaped = stats
                .escaped
                .iter()
                .filter(|&&id| {
                    record
                        .tokens
                        .get(id as usize)
                        .is_some_and(|t| t.player == player)
                })
                .count();

            let mut body = vec![
                format!(
                    "The battle at {location} lasted {} round(s).",
                    stats.rounds_fought
                ),
                format!(
                    "You brought {} ship(s) and lost {lost}.",
                    ships_of(record, player)
                ),
                format!(
                    "Other participants lost {} ship(s).",
                    total_lost.saturating_sub(lost)
                ),
            ];
            if escaped > 0 {
                body.push(format!("{escaped} of your stack(s) disengaged."));
            }

            let subject = if stats.rounds_fought == 0 {
                format!("No engagement at {location}")
            } else if outcome.surviving_players().contains(&player) {
                format!("Battle at {location}")
            } else {
                format!("Fleets lost at {location}")
            };

            BattleMessage {
                player,
                subject,
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::board::BoardPosition;
    use battle_test_utils::fixtures::{aggressive_fleet, resolve, DESTROYER, FREIGHTER};

    #[test]
    fn test_describe_weapon_fire() {
        let line = describe_action(&BattleAction::WeaponFire {
            kind: WeaponKind::Torpedo,
            token: 2,
            slot: 1,
            target: 5,
            damage: 30,
            shield_damage: 10,
            armor_damage: 20,
            destroyed: 1,
        });
        assert_eq!(
            line,
            "Token 2 fired torpedoes (slot 1) at token 5 for 30 damage \
             (10 to shields, 20 to armor), destroying 1"
        );
    }

    #[test]
    fn test_describe_move() {
        let line = describe_action(&BattleAction::Move {
            token: 0,
            from: BoardPosition::new(1, 4),
            to: BoardPosition::new(2, 5),
        });
        assert_eq!(line, "Token 0 moved from (1, 4) to (2, 5)");
    }

    #[test]
    fn test_one_message_per_player() {
        let outcome = resolve(&[
            aggressive_fleet(1, 1, DESTROYER, 4),
            aggressive_fleet(2, 2, FREIGHTER, 1),
        ])
        .unwrap();
        let messages = battle_messages("Alpha Centauri", &outcome);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].player, 1);
        assert_eq!(messages[0].subject, "Battle at Alpha Centauri");
        assert!(messages[0].body[1].starts_with("You brought 4 ship(s)"));
    }

    #[test]
    fn test_quiet_battle_message() {
        let outcome = resolve(&[aggressive_fleet(1, 1, DESTROYER, 1)]).unwrap();
        let messages = battle_messages("Sol", &outcome);
        assert_eq!(messages[0].subject, "No engagement at Sol");
        assert!(describe_record(outcome.record.player(1).unwrap()).is_empty());
    }
}
