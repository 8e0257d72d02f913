//! Job match score for a job seeker, 0 to 100.
//!
//! Skill overlap carries 60 points, a field match 20 and proximity 20.
//! Proximity decays linearly to zero at [`PROXIMITY_RADIUS_KM`].

use crate::dto::application_dto::JobMatch;
use crate::models::job::Job;
use crate::models::profile::JobseekerProfile;
use crate::utils::geo::haversine_km;

const SKILL_WEIGHT: f64 = 60.0;
const FIELD_WEIGHT: f64 = 20.0;
const PROXIMITY_WEIGHT: f64 = 20.0;
pub const PROXIMITY_RADIUS_KM: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub score: u8,
    pub distance_km: Option<f64>,
}

pub fn score(job: &Job, seeker: &JobseekerProfile) -> MatchScore {
    let skills = if job.required_skills.is_empty() {
        1.0
    } else {
        let matched = job
            .required_skills
            .iter()
            .filter(|required| {
                seeker
                    .skills
                    .iter()
                    .any(|have| have.trim().eq_ignore_ascii_case(required.trim()))
            })
            .count();
        matched as f64 / job.required_skills.len() as f64
    };

    let field = match seeker.preferred_field.as_deref() {
        Some(preferred) if preferred.trim().eq_ignore_ascii_case(job.field.trim()) => 1.0,
        _ => 0.0,
    };

    let distance_km = match (job.latitude, job.longitude, seeker.latitude, seeker.longitude) {
        (Some(jlat), Some(jlon), Some(slat), Some(slon)) => Some(haversine_km(jlat, jlon, slat, slon)),
        _ => None,
    };
    let proximity = distance_km
        .map(|d| (1.0 - d / PROXIMITY_RADIUS_KM).max(0.0))
        .unwrap_or(0.0);

    let total = SKILL_WEIGHT * skills + FIELD_WEIGHT * field + PROXIMITY_WEIGHT * proximity;
    MatchScore {
        score: total.round().clamp(0.0, 100.0) as u8,
        distance_km,
    }
}

/// Scores every job and returns them best first. Ties go to the closer job.
pub fn rank(jobs: Vec<Job>, seeker: &JobseekerProfile, limit: usize) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = jobs
        .into_iter()
        .map(|job| {
            let MatchScore { score, distance_km } = score(&job, seeker);
            JobMatch {
                job,
                score,
                distance_km,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score.cmp(&a.score).then_with(|| {
            let da = a.distance_km.unwrap_or(f64::INFINITY);
            let db = b.distance_km.unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        })
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn job(skills: &[&str], field: &str, coords: Option<(f64, f64)>) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "Sales Clerk".into(),
            description: "Front counter".into(),
            field: field.into(),
            job_type: "full_time".into(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            salary_min: None,
            salary_max: None,
            location: "Bago City".into(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn seeker(skills: &[&str], field: Option<&str>, coords: Option<(f64, f64)>) -> JobseekerProfile {
        let now = Utc::now();
        JobseekerProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            preferred_field: field.map(str::to_string),
            address: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            photo_path: String::new(),
            valid_id_path: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    const BAGO: (f64, f64) = (10.5377, 122.8363);

    #[test]
    fn perfect_match_scores_100() {
        let result = score(
            &job(&["cashiering", "inventory"], "Retail", Some(BAGO)),
            &seeker(&["Inventory", "cashiering"], Some("retail"), Some(BAGO)),
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.distance_km.map(|d| d < 1e-6), Some(true));
    }

    #[test]
    fn half_the_skills_without_field_or_location() {
        let result = score(
            &job(&["welding", "driving"], "Construction", None),
            &seeker(&["driving"], Some("Retail"), Some(BAGO)),
        );
        assert_eq!(result.score, 30);
        assert_eq!(result.distance_km, None);
    }

    #[test]
    fn jobs_without_required_skills_give_full_skill_weight() {
        let result = score(&job(&[], "Retail", None), &seeker(&[], None, None));
        assert_eq!(result.score, 60);
    }

    #[test]
    fn proximity_fades_out_at_the_radius() {
        // Roughly 33 km north of Bago.
        let far = score(
            &job(&["x"], "Other", Some((10.84, 122.8363))),
            &seeker(&[], None, Some(BAGO)),
        );
        assert_eq!(far.score, 0);
        assert!(far.distance_km.unwrap_or_default() > PROXIMITY_RADIUS_KM);
    }

    #[test]
    fn ranking_prefers_higher_scores_then_closer_jobs() {
        let me = seeker(&["cooking"], Some("Food Service"), Some(BAGO));
        let near = job(&["cooking"], "Food Service", Some((10.54, 122.84)));
        let exact = job(&["cooking"], "Food Service", Some(BAGO));
        let weak = job(&["nursing"], "Health", Some(BAGO));
        let ids = [exact.id, near.id];

        let ranked = rank(vec![weak, near, exact], &me, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.iter().map(|m| m.job.id).collect::<Vec<_>>(), ids);
    }
}
