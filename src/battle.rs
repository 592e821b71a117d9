use crate::card::{BattlePosition, Card};

/// The stats of a creature that matter in battle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Combatant {
    pub attack: u32,
    pub defense: u32,
    pub position: BattlePosition,
}

impl Combatant {
    pub fn new(attack: u32, defense: u32, position: BattlePosition) -> Self {
        Combatant {
            attack,
            defense,
            position,
        }
    }

    pub fn from_card(card: &Card) -> Option<Combatant> {
        card.creature()
            .map(|creature| Combatant::new(creature.attack, creature.defense, creature.position))
    }

    /// The stat an attacker has to beat: defense for defenders, attack otherwise.
    pub fn guarding_stat(&self) -> u32 {
        if self.position.is_defense() {
            self.defense
        } else {
            self.attack
        }
    }
}

/// What a battle did. Damage is life to subtract from each side's controller.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Outcome {
    pub attacker_destroyed: bool,
    pub defender_destroyed: bool,
    pub attacker_damage: u32,
    pub defender_damage: u32,
}

/// `None` as the defender is a direct attack.
pub fn resolve(attacker: Combatant, defender: Option<Combatant>) -> Outcome {
    let defender = match defender {
        None => {
            return Outcome {
                defender_damage: attacker.attack,
                ..Outcome::default()
            }
        }
        Some(defender) => defender,
    };
    if defender.position.is_defense() {
        if attacker.attack > defender.defense {
            Outcome {
                defender_destroyed: true,
                ..Outcome::default()
            }
        } else {
            Outcome {
                attacker_damage: defender.defense - attacker.attack,
                ..Outcome::default()
            }
        }
    } else if attacker.attack > defender.attack {
        Outcome {
            defender_destroyed: true,
            defender_damage: attacker.attack - defender.attack,
            ..Outcome::default()
        }
    } else if attacker.attack < defender.attack {
        Outcome {
            attacker_destroyed: true,
            attacker_damage: defender.attack - attacker.attack,
            ..Outcome::default()
        }
    } else {
        Outcome {
            attacker_destroyed: true,
            defender_destroyed: true,
            ..Outcome::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attacking(attack: u32) -> Combatant {
        Combatant::new(attack, 0, BattlePosition::Attack)
    }

    fn defending(defense: u32) -> Combatant {
        Combatant::new(0, defense, BattlePosition::Defense)
    }

    #[test]
    fn direct_attack_deals_full_attack() {
        let outcome = resolve(attacking(1900), None);
        assert_eq!(outcome.defender_damage, 1900);
        assert!(!outcome.attacker_destroyed && !outcome.defender_destroyed);
    }

    #[test]
    fn equal_attackers_destroy_each_other() {
        let outcome = resolve(attacking(1500), Some(attacking(1500)));
        assert!(outcome.attacker_destroyed && outcome.defender_destroyed);
        assert_eq!((outcome.attacker_damage, outcome.defender_damage), (0, 0));
    }

    #[test]
    fn stronger_attacker_wins_with_difference_as_damage() {
        let outcome = resolve(attacking(2400), Some(attacking(1800)));
        assert!(outcome.defender_destroyed && !outcome.attacker_destroyed);
        assert_eq!(outcome.defender_damage, 600);
        assert_eq!(outcome.attacker_damage, 0);
    }

    #[test]
    fn weaker_attacker_is_destroyed() {
        let outcome = resolve(attacking(1000), Some(attacking(1700)));
        assert!(outcome.attacker_destroyed && !outcome.defender_destroyed);
        assert_eq!(outcome.attacker_damage, 700);
    }

    #[test]
    fn breaking_defense_deals_no_damage() {
        let outcome = resolve(attacking(1600), Some(defending(1200)));
        assert!(outcome.defender_destroyed);
        assert_eq!((outcome.attacker_damage, outcome.defender_damage), (0, 0));
    }

    #[test]
    fn bouncing_off_defense_hurts_the_attacker() {
        let outcome = resolve(attacking(1000), Some(defending(2000)));
        assert!(!outcome.defender_destroyed && !outcome.attacker_destroyed);
        assert_eq!(outcome.attacker_damage, 1000);

        let tie = resolve(attacking(1500), Some(defending(1500)));
        assert_eq!(tie, Outcome::default());
    }

    #[test]
    fn face_down_defenders_use_defense() {
        let hidden = Combatant::new(3000, 500, BattlePosition::FaceDownDefense);
        assert_eq!(hidden.guarding_stat(), 500);
        assert!(resolve(attacking(600), Some(hidden)).defender_destroyed);
    }
}
