use crate::{
    usecases::{Error, LocationOutcome},
    Id,
};

pub type OrganizationResult = Result<LocationOutcome, Error>;

/// The outcome of every organization a pass has visited.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    pub entries: Vec<(Id, OrganizationResult)>,
    /// The pass stopped early because it has been cancelled.
    pub cancelled: bool,
}

impl ReconciliationReport {
    pub(crate) fn push(&mut self, id: Id, result: OrganizationResult) {
        self.entries.push((id, result));
    }

    fn count(&self, pred: impl Fn(&OrganizationResult) -> bool) -> usize {
        self.entries.iter().filter(|(_, res)| pred(res)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|res| matches!(res, Ok(LocationOutcome::Updated(_))))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|res| matches!(res, Ok(LocationOutcome::Unchanged { .. })))
    }

    /// Organizations without a usable address.
    pub fn skipped(&self) -> usize {
        self.count(|res| matches!(res, Err(Error::AddressUnavailable)))
    }

    pub fn failed(&self) -> usize {
        self.count(|res| res.is_err()) - self.skipped()
    }

    /// Organizations whose position could not be confirmed or corrected.
    pub fn unresolved(&self) -> usize {
        self.count(|res| res.is_err())
    }

    pub fn retryable_failures(&self) -> usize {
        self.count(|res| res.as_ref().is_err_and(Error::is_retryable))
    }

    pub fn terminal_failures(&self) -> usize {
        self.count(|res| res.as_ref().is_err_and(Error::is_terminal))
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Id, &Error)> {
        self.entries
            .iter()
            .filter_map(|(id, res)| res.as_ref().err().map(|err| (id, err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Distance, GeocodeError, LocationUpdate, MapPoint, Timestamp};
    use chimeo_core::repositories::Error as RepoError;

    #[test]
    fn count_outcomes() {
        let update = LocationUpdate {
            pos: MapPoint::try_from_lat_lng_deg(1.0, 2.0).unwrap(),
            address: Address::default(),
            updated_at: Timestamp::now(),
        };
        let mut report = ReconciliationReport::default();
        report.push("a".into(), Ok(LocationOutcome::Updated(update)));
        report.push(
            "b".into(),
            Ok(LocationOutcome::Unchanged {
                drift: Distance::from_meters(3.0),
            }),
        );
        report.push("c".into(), Err(Error::AddressUnavailable));
        report.push("d".into(), Err(GeocodeError::NotFound.into()));
        report.push(
            "e".into(),
            Err(GeocodeError::Transient("timeout".into()).into()),
        );
        report.push("f".into(), Err(RepoError::NotFound.into()));
        report.push("g".into(), Err(Error::Cancelled));

        assert_eq!(1, report.updated());
        assert_eq!(1, report.unchanged());
        assert_eq!(1, report.skipped());
        assert_eq!(4, report.failed());
        assert_eq!(5, report.unresolved());
        assert_eq!(1, report.retryable_failures());
        assert_eq!(3, report.terminal_failures());
        assert_eq!(
            vec!["c", "d", "e", "f", "g"],
            report
                .errors()
                .map(|(id, _)| id.as_str())
                .collect::<Vec<_>>()
        );
    }
}
