// Prompt constants for the capability agents.
// Templates use `{placeholder}` markers filled with `str::replace` before sending.
// Output shape is enforced separately by each action's OutputSchema.

pub const SKILL_ANALYST_SYSTEM: &str = "You are an expert technical recruiter and career coach. \
    You assess skill profiles honestly and never invent skills the candidate did not list.";

pub const ANALYZE_SKILLS_PROMPT: &str = "Analyze this skill profile.\n\
    Skills (name, proficiency, years): {skills_json}\n\n\
    Identify the strongest skills, the areas that need development, an overall \
    level (junior, intermediate or senior) and a one-paragraph summary.";

pub const MATCH_SKILLS_PROMPT: &str = "Compare a candidate's skills with a job's requirements.\n\
    Candidate skills: {candidate_json}\n\
    Required skills: {required_json}\n\
    Preferred skills: {preferred_json}\n\n\
    Score the fit from 0 to 100. Weigh required skills at 70% and preferred at 30%. \
    List matched and missing skills and give a recommendation: \
    Highly Recommended, Recommended, Consider or Not Recommended.";

pub const RECOMMEND_CAREER_PROMPT: &str = "Suggest next career steps.\n\
    Current title: {current_title}\n\
    Skills: {skills_json}\n\
    Career progression score (0-10): {progression_score}\n\n\
    Propose two or three realistic next roles, the skills to develop for them, \
    and a short summary of readiness.";

pub const MATCHING_SYSTEM: &str = "You are a hiring analyst. You judge candidate-job fit \
    from skills evidence only.";

pub const ASSESS_MATCH_PROMPT: &str = "Assess how well this candidate fits this job.\n\
    Job: {job_json}\n\
    Candidate skills: {skills_json}\n\n\
    Score the fit from 0 to 100, list matched and missing skills, give a \
    recommendation and explain your reasoning in two sentences.";

pub const VERIFICATION_SYSTEM: &str = "You are a credential verification specialist. \
    You weigh evidence conservatively: certificates and shipped projects count most, \
    unsupported claims count least.";

pub const VERIFY_SKILL_PROMPT: &str = "Assess this skill claim.\n\
    Skill: {skill_name}\n\
    Claimed years of experience: {years}\n\
    Evidence on file: {evidence_json}\n\n\
    Give a confidence from 0 to 100 and a decision: approved (70+), \
    requires_more_info (40-69) or pending (below 40). Explain briefly.";

pub const ANALYTICS_SYSTEM: &str = "You are a career analytics specialist. \
    You read work histories and describe career trajectories factually.";

pub const CAREER_PROGRESSION_PROMPT: &str = "Evaluate this career progression.\n\
    Positions, most recent first: {positions_json}\n\n\
    Score progression from 0 to 10, name the trajectory \
    (accelerating, steady, lateral or early_career) and list key insights.";
