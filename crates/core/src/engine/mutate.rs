//! Board mutation primitives. Every discrete change lands here so that
//! uncover re-dispatch, reactive passes and the turn tallies stay uniform no
//! matter which resolution path asked for the change. Primitives trust their
//! callers to have validated legality; they only spawn follow-up work.

use super::{dispatch, Engine};
use crate::cards::{Card, CardId, Side};
use crate::effect::TriggerKind;
use crate::events::{Event, EventBus};
use crate::state::BoardSlot;

impl Engine {
    /// Setup-time dealing. No tallies, no reactive passes.
    pub(crate) fn deal(&mut self, side: Side, count: usize, events: &mut EventBus) {
        let mut dealt = 0;
        for _ in 0..count {
            match self.state.side_mut(side).deck.pop() {
                Some(card) => {
                    self.state.side_mut(side).hand.push(card);
                    dealt += 1;
                }
                None => break,
            }
        }
        if dealt > 0 {
            events.push(Event::CardsDrawn { side, count: dealt });
        }
    }

    /// Draw up to `count` cards, reshuffling the discard pile into the deck
    /// when it runs dry. Returns how many cards actually moved.
    pub(crate) fn draw_cards(&mut self, side: Side, count: u32, events: &mut EventBus) -> usize {
        let mut drawn = 0;
        for _ in 0..count {
            if self.state.side(side).deck.is_empty() {
                self.reshuffle_discard(side);
            }
            match self.state.side_mut(side).deck.pop() {
                Some(card) => {
                    self.state.side_mut(side).hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        if drawn > 0 {
            self.state.side_mut(side).stats.drawn += drawn as u32;
            events.push(Event::CardsDrawn { side, count: drawn });
            self.state
                .log_line(format!("{} draws {} card(s)", side.label(), drawn));
            self.spawn_board_pass(TriggerKind::AfterDraw, Some(side));
        } else if count > 0 {
            self.state
                .log_line(format!("{} has no cards left to draw", side.label()));
        }
        drawn
    }

    fn reshuffle_discard(&mut self, side: Side) {
        let player = self.state.side_mut(side);
        if player.discard.is_empty() {
            return;
        }
        let mut pile = std::mem::take(&mut player.discard);
        for card in &mut pile {
            card.face_up = false;
            card.revealed = false;
        }
        self.rng.shuffle(&mut pile);
        self.state.side_mut(side).deck = pile;
        self.state
            .log_line(format!("{} reshuffles the trash into the deck", side.label()));
    }

    /// Lift the top card of a deck, reshuffling the trash first if the deck
    /// ran dry. Used by effects that play straight from the deck.
    pub(crate) fn pop_deck_top(&mut self, side: Side) -> Option<Card> {
        if self.state.side(side).deck.is_empty() {
            self.reshuffle_discard(side);
        }
        self.state.side_mut(side).deck.pop()
    }

    /// Discard specific hand cards as one batch: one tally bump per card but a
    /// single reactive pass.
    pub(crate) fn discard_hand(&mut self, side: Side, ids: &[CardId], events: &mut EventBus) {
        let mut moved = 0;
        for id in ids {
            let position = self.state.side(side).hand_position(*id);
            if let Some(position) = position {
                let card = self.state.side_mut(side).hand.remove(position);
                let title = card.title();
                self.state.side_mut(side).discard.push(card);
                self.state.side_mut(side).stats.discarded += 1;
                events.push(Event::CardDiscarded { card: *id, side });
                self.state
                    .log_line(format!("{} discards {}", side.label(), title));
                moved += 1;
            }
        }
        if moved > 0 {
            self.spawn_board_pass(TriggerKind::AfterDiscard, Some(side));
        }
    }

    pub(crate) fn discard_random(
        &mut self,
        side: Side,
        count: u32,
        events: &mut EventBus,
    ) -> usize {
        let mut picked = Vec::new();
        for _ in 0..count {
            let hand = &self.state.side(side).hand;
            let remaining: Vec<CardId> = hand
                .iter()
                .map(|card| card.id)
                .filter(|id| !picked.contains(id))
                .collect();
            match self.rng.pick_index(remaining.len()) {
                Some(index) => picked.push(remaining[index]),
                None => break,
            }
        }
        self.discard_hand(side, &picked, events);
        picked.len()
    }

    /// Remove a card from its stack. When the stack top leaves, the newly
    /// uncovered face-up card gets its middle commands re-dispatched.
    fn remove_from_board(&mut self, id: CardId) -> Option<(Card, BoardSlot)> {
        let slot = self.state.board_slot(id)?;
        let card = self.state.side_mut(slot.side).lanes[slot.lane].remove(slot.index);
        let stack = &self.state.side(slot.side).lanes[slot.lane];
        if slot.index == stack.len() {
            if let Some(top) = stack.last() {
                if top.face_up {
                    self.spawn_card_trigger(top.id, TriggerKind::OnPlay);
                }
            }
        }
        Some((card, slot))
    }

    pub(crate) fn delete_card(&mut self, id: CardId, events: &mut EventBus) -> bool {
        let (mut card, slot) = match self.remove_from_board(id) {
            Some(found) => found,
            None => return false,
        };
        let title = card.title();
        card.face_up = false;
        card.revealed = false;
        self.state.side_mut(slot.side).discard.push(card);
        self.state.side_mut(slot.side).stats.deleted += 1;
        events.push(Event::CardDeleted {
            card: id,
            side: slot.side,
            lane: slot.lane,
        });
        self.state.log_line(format!(
            "{} from line {} is deleted ({})",
            title,
            slot.lane + 1,
            slot.side.label()
        ));
        self.spawn_board_pass(TriggerKind::AfterDelete, Some(slot.side));
        true
    }

    pub(crate) fn flip_card(&mut self, id: CardId, events: &mut EventBus) -> bool {
        let slot = match self.state.board_slot(id) {
            Some(slot) => slot,
            None => return false,
        };
        let (title, face_up, is_flip_trap) = {
            let card = &mut self.state.side_mut(slot.side).lanes[slot.lane][slot.index];
            card.face_up = !card.face_up;
            card.revealed = false;
            (card.title(), card.face_up, card.is_builtin() && card.protocol == "Death" && card.value == 0)
        };
        self.state.side_mut(slot.side).stats.flipped += 1;
        events.push(Event::CardFlipped {
            card: id,
            side: slot.side,
            lane: slot.lane,
            face_up,
        });
        if face_up {
            self.state.log_line(format!(
                "{} in line {} flips face-up",
                title,
                slot.lane + 1
            ));
        } else {
            self.state.log_line(format!(
                "A card in line {} flips face-down",
                slot.lane + 1
            ));
        }
        // Death-0 deletes itself on any flip, before ordinary flip dispatch.
        if is_flip_trap {
            self.delete_card(id, events);
            return true;
        }
        if face_up {
            self.spawn_card_trigger(id, TriggerKind::OnFlip);
            self.spawn_card_trigger(id, TriggerKind::OnPlay);
        }
        self.spawn_board_pass(TriggerKind::AfterFlip, Some(slot.side));
        true
    }

    pub(crate) fn shift_card(&mut self, id: CardId, to: usize, events: &mut EventBus) -> bool {
        let (card, slot) = match self.remove_from_board(id) {
            Some(found) => found,
            None => return false,
        };
        let title = if card.face_up {
            card.title()
        } else {
            "a face-down card".to_string()
        };
        if let Some(top) = self.state.top_of(slot.side, to) {
            self.spawn_card_trigger(top.id, TriggerKind::OnCover);
        }
        self.state.side_mut(slot.side).lanes[to].push(card);
        self.state.side_mut(slot.side).stats.shifted += 1;
        events.push(Event::CardShifted {
            card: id,
            side: slot.side,
            from: slot.lane,
            to,
        });
        self.state.log_line(format!(
            "{} shifts {} from line {} to line {}",
            slot.side.label(),
            title,
            slot.lane + 1,
            to + 1
        ));
        self.spawn_board_pass(TriggerKind::AfterShift, Some(slot.side));
        true
    }

    pub(crate) fn return_card(&mut self, id: CardId, events: &mut EventBus) -> bool {
        let (mut card, slot) = match self.remove_from_board(id) {
            Some(found) => found,
            None => return false,
        };
        let title = card.title();
        card.face_up = false;
        card.revealed = false;
        self.state.side_mut(slot.side).hand.push(card);
        events.push(Event::CardReturned {
            card: id,
            side: slot.side,
            lane: slot.lane,
        });
        self.state.log_line(format!(
            "{} returns to {}'s hand",
            title,
            slot.side.label()
        ));
        true
    }

    pub(crate) fn reveal_card(&mut self, id: CardId, events: &mut EventBus) -> bool {
        let slot = match self.state.board_slot(id) {
            Some(slot) => slot,
            None => return false,
        };
        let card = &mut self.state.side_mut(slot.side).lanes[slot.lane][slot.index];
        if card.face_up || card.revealed {
            return false;
        }
        card.revealed = true;
        let title = card.title();
        events.push(Event::CardRevealed {
            card: id,
            side: slot.side,
            lane: slot.lane,
        });
        self.state.log_line(format!(
            "{} in line {} is revealed",
            title,
            slot.lane + 1
        ));
        true
    }

    /// Put a card on top of a stack. The covered card's on-cover effects are
    /// spawned first; the caller decides whether the arriving card dispatches.
    pub(crate) fn play_to_lane(
        &mut self,
        side: Side,
        mut card: Card,
        lane: usize,
        face_up: bool,
        events: &mut EventBus,
    ) -> CardId {
        let id = card.id;
        let title = card.title();
        card.face_up = face_up;
        card.revealed = false;
        if let Some(top) = self.state.top_of(side, lane) {
            self.spawn_card_trigger(top.id, TriggerKind::OnCover);
        }
        self.state.side_mut(side).lanes[lane].push(card);
        self.state.side_mut(side).stats.played += 1;
        events.push(Event::CardPlayed {
            card: id,
            side,
            lane,
            face_up,
        });
        if face_up {
            self.state.log_line(format!(
                "{} plays {} face-up in line {}",
                side.label(),
                title,
                lane + 1
            ));
        } else {
            self.state.log_line(format!(
                "{} plays a card face-down in line {}",
                side.label(),
                lane + 1
            ));
        }
        id
    }

    pub(crate) fn give_hand_card(&mut self, from: Side, id: CardId, events: &mut EventBus) -> bool {
        let position = match self.state.side(from).hand_position(id) {
            Some(position) => position,
            None => return false,
        };
        let card = self.state.side_mut(from).hand.remove(position);
        self.state.side_mut(from.flip()).hand.push(card);
        events.push(Event::CardGiven {
            card: id,
            from,
            to: from.flip(),
        });
        self.state.log_line(format!(
            "{} gives a card to {}",
            from.label(),
            from.flip().label()
        ));
        true
    }

    pub(crate) fn take_random(&mut self, taker: Side, events: &mut EventBus) -> Option<CardId> {
        let victim = taker.flip();
        let index = self.rng.pick_index(self.state.side(victim).hand.len())?;
        let card = self.state.side_mut(victim).hand.remove(index);
        let id = card.id;
        self.state.side_mut(taker).hand.push(card);
        events.push(Event::CardGiven {
            card: id,
            from: victim,
            to: taker,
        });
        self.state.log_line(format!(
            "{} takes a random card from {}",
            taker.label(),
            victim.label()
        ));
        Some(id)
    }

    /// Reorder protocol assignments; compile flags travel with their protocol.
    pub(crate) fn rearrange_protocols(
        &mut self,
        side: Side,
        order: &[usize],
        events: &mut EventBus,
    ) {
        let player = self.state.side_mut(side);
        let protocols: Vec<String> = order
            .iter()
            .map(|old| player.protocols[*old].clone())
            .collect();
        let compiled: Vec<bool> = order.iter().map(|old| player.compiled[*old]).collect();
        player.protocols = protocols;
        player.compiled = compiled;
        events.push(Event::ProtocolsRearranged { side });
        self.state
            .log_line(format!("{}'s protocols are rearranged", side.label()));
    }

    pub(crate) fn swap_protocols(&mut self, side: Side, a: usize, b: usize, events: &mut EventBus) {
        let player = self.state.side_mut(side);
        player.protocols.swap(a, b);
        player.compiled.swap(a, b);
        events.push(Event::ProtocolsRearranged { side });
        self.state.log_line(format!(
            "{}'s protocols in lines {} and {} are swapped",
            side.label(),
            a + 1,
            b + 1
        ));
    }

    /// Clear both stacks of a line and mark it compiled for `side`. Cleared
    /// cards go to the trash without counting as deleted.
    pub(crate) fn compile_lane(&mut self, side: Side, lane: usize, events: &mut EventBus) {
        for clear_side in [Side::Player, Side::Opponent] {
            let player = self.state.side_mut(clear_side);
            let mut stack = std::mem::take(&mut player.lanes[lane]);
            for card in &mut stack {
                card.face_up = false;
                card.revealed = false;
            }
            player.discard.extend(stack);
        }
        let protocol = self.state.side(side).protocols[lane].clone();
        self.state.side_mut(side).compiled[lane] = true;
        events.push(Event::LaneCompiled {
            side,
            lane,
            protocol: protocol.clone(),
        });
        self.state.log_line(format!(
            "{} compiles {} in line {}",
            side.label(),
            protocol,
            lane + 1
        ));
        if self.state.side(side).all_compiled() {
            self.state.winner = Some(side);
            self.state.phase = crate::state::Phase::GameOver;
            self.state.pending = None;
            self.state.queue.clear();
            self.spawned.clear();
            events.push(Event::GameWon { side });
            self.state
                .log_line(format!("{} wins the game", side.label()));
        }
    }

    /// Queue one card's effects for a trigger, if it has any.
    pub(crate) fn spawn_card_trigger(&mut self, id: CardId, trigger: TriggerKind) {
        let steps = dispatch::card_steps(&self.state, &self.catalog, id, trigger);
        self.spawned.extend(steps);
    }

    /// Queue a whole-board reactive or turn pass. `subject` narrows reactive
    /// triggers to effects listening for that side's actions.
    pub(crate) fn spawn_board_pass(&mut self, trigger: TriggerKind, subject: Option<Side>) {
        let steps = dispatch::board_steps(&self.state, &self.catalog, trigger, subject);
        self.spawned.extend(steps);
    }
}
