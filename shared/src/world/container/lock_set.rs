use log::debug;

use crate::{
    world::container::{error::ContainerError, guard::ContainerGuard},
    Container, LockToken,
};

/// How [`LockSet::extend`] obtained an additional lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relock {
    /// The container was already part of the set
    AlreadyHeld,
    /// Its token sorted after every held lock, so it was simply acquired
    Appended,
    /// Everything was released and reacquired in ascending order. State
    /// observed before the call may be stale.
    Reacquired,
}

// LockSet

/// Holds the locks of several containers, always acquired in strictly
/// ascending [`LockToken`] order.
///
/// Because every task that holds more than one container lock goes through
/// this type, no two tasks can wait on each other in a cycle. Duplicate
/// containers are collapsed so a set never locks the same container twice.
pub struct LockSet<'c> {
    // ascending by token
    guards: Vec<ContainerGuard<'c>>,
}

impl<'c> LockSet<'c> {
    pub fn acquire(containers: &[&'c Container]) -> Result<Self, ContainerError> {
        let mut ordered: Vec<&'c Container> = containers.to_vec();
        ordered.sort_by_key(|container| container.token());
        ordered.dedup_by_key(|container| container.token());

        let mut guards = Vec::with_capacity(ordered.len());
        for container in ordered {
            guards.push(container.lock()?);
        }
        Ok(Self { guards })
    }

    pub fn tokens(&self) -> Vec<LockToken> {
        self.guards.iter().map(|guard| guard.token()).collect()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn holds(&self, token: LockToken) -> bool {
        self.position(token).is_ok()
    }

    pub fn get(&self, token: LockToken) -> Result<&ContainerGuard<'c>, ContainerError> {
        let index = self
            .position(token)
            .map_err(|_| ContainerError::NotLocked { token })?;
        Ok(&self.guards[index])
    }

    pub fn get_mut(&mut self, token: LockToken) -> Result<&mut ContainerGuard<'c>, ContainerError> {
        let index = self
            .position(token)
            .map_err(|_| ContainerError::NotLocked { token })?;
        Ok(&mut self.guards[index])
    }

    /// Two distinct guards from the set, in the order asked for.
    pub fn pair_mut(
        &mut self,
        first: LockToken,
        second: LockToken,
    ) -> Result<(&mut ContainerGuard<'c>, &mut ContainerGuard<'c>), ContainerError> {
        if first == second {
            return Err(ContainerError::SameContainer { token: first });
        }
        let i = self
            .position(first)
            .map_err(|_| ContainerError::NotLocked { token: first })?;
        let j = self
            .position(second)
            .map_err(|_| ContainerError::NotLocked { token: second })?;

        if i < j {
            let (low, high) = self.guards.split_at_mut(j);
            Ok((&mut low[i], &mut high[0]))
        } else {
            let (low, high) = self.guards.split_at_mut(i);
            Ok((&mut high[0], &mut low[j]))
        }
    }

    /// Adds another container to the set without breaking the ordering rule.
    ///
    /// If its token is above every held token it is locked directly. Otherwise
    /// all held locks are released and the whole set is reacquired in
    /// ascending order; callers must then revalidate anything they checked.
    pub fn extend(&mut self, container: &'c Container) -> Result<Relock, ContainerError> {
        let token = container.token();
        if self.holds(token) {
            return Ok(Relock::AlreadyHeld);
        }
        let above_all = self
            .guards
            .last()
            .map_or(true, |highest| highest.token() < token);
        if above_all {
            self.guards.push(container.lock()?);
            return Ok(Relock::Appended);
        }

        let mut containers: Vec<&'c Container> =
            self.guards.iter().map(|guard| guard.container()).collect();
        containers.push(container);
        debug!("Releasing {} locks to reacquire in order with {}", self.guards.len(), token);
        self.guards.clear();
        *self = Self::acquire(&containers)?;
        Ok(Relock::Reacquired)
    }

    fn position(&self, token: LockToken) -> Result<usize, usize> {
        self.guards.binary_search_by_key(&token, |guard| guard.token())
    }
}
